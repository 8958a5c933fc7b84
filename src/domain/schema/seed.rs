//! The example schema written by `POST /api/seed`.

use super::{CaseTransform, Schema, VariableDefinition, VariableKind};
use std::collections::BTreeMap;

fn described(
    variable: VariableDefinition,
    description: &str,
    options: &[(&str, &str)],
) -> VariableDefinition {
    let mut variable = variable
        .with_options(options.iter().map(|(option, _)| *option))
        .with_description(description);
    if !options.is_empty() {
        variable.option_descriptions = Some(
            options
                .iter()
                .map(|(option, text)| (option.to_string(), text.to_string()))
                .collect::<BTreeMap<_, _>>(),
        );
    }
    variable
}

/// Ad-creative schema: size, persona, funnel stage, archetype, hook, CTA, style, description.
pub fn example_schema() -> Schema {
    use VariableKind::*;

    let variables = vec![
        described(
            VariableDefinition::new("1", "Size", SingleSelect),
            "The dimensions of the ad creative",
            &[
                ("1080x1080", "Square format, ideal for Instagram feed"),
                ("1080x1350", "Portrait format, good for Instagram Stories"),
                ("1080x1920", "Vertical format, perfect for Reels and Stories"),
                ("1920x1080", "Landscape format, standard for video ads"),
                ("1200x628", "Facebook link preview format"),
            ],
        ),
        described(
            VariableDefinition::new("2", "Persona", SingleSelect),
            "The target audience persona for this ad",
            &[
                ("Creator", "Content creators and influencers"),
                ("Business", "Business owners and entrepreneurs"),
                ("Agency", "Marketing agencies and professionals"),
                ("Generic", "General audience"),
            ],
        ),
        described(
            VariableDefinition::new("3", "Funnel Stage", SingleSelect),
            "The stage of the marketing funnel",
            &[
                ("Cold", "Top of funnel - awareness stage"),
                ("Warm", "Middle of funnel - consideration stage"),
                ("Hot", "Bottom of funnel - conversion stage"),
            ],
        ),
        described(
            VariableDefinition::new("4", "Archetype", MultiSelect),
            "Brand archetype(s) represented in the ad",
            &[
                ("Hero", "Overcomes challenges and adversity"),
                ("Sage", "Seeks truth and wisdom"),
                ("Outlaw", "Rebels against the status quo"),
                ("Explorer", "Seeks freedom and adventure"),
                ("Creator", "Brings imagination to life"),
                ("Ruler", "Takes control and leads"),
                ("Magician", "Transforms reality"),
                ("Innocent", "Optimistic and pure"),
                ("Caregiver", "Nurtures and protects"),
                ("Jester", "Brings joy and humor"),
                ("Lover", "Seeks connection and intimacy"),
                ("Orphan", "Seeks belonging and acceptance"),
            ],
        ),
        described(
            VariableDefinition::new("5", "Hook", SingleSelect),
            "The hook type used to capture attention",
            &[
                ("Problem", "Highlights a pain point"),
                ("Solution", "Presents a solution"),
                ("Story", "Uses narrative to engage"),
                ("Question", "Asks a thought-provoking question"),
                ("Statistic", "Uses data to make a point"),
                ("Controversy", "Challenges conventional thinking"),
            ],
        ),
        described(
            VariableDefinition::new("6", "CTA", SingleSelect),
            "The call-to-action in the ad",
            &[
                ("Learn More", "Encourages information seeking"),
                ("Sign Up", "Prompts registration"),
                ("Buy Now", "Direct purchase action"),
                ("Download", "Promotes app or resource download"),
                ("Get Started", "Initiates onboarding"),
                ("Watch Now", "Encourages video consumption"),
            ],
        ),
        described(
            VariableDefinition::new("7", "Style", SingleSelect),
            "The visual style of the ad creative",
            &[
                ("Minimalist", "Clean and simple design"),
                ("Bold", "High contrast and attention-grabbing"),
                ("Playful", "Fun and energetic"),
                ("Professional", "Corporate and polished"),
                ("Vintage", "Retro aesthetic"),
                ("Modern", "Contemporary and sleek"),
            ],
        ),
        described(
            VariableDefinition::new("8", "Ad Description", FreeText),
            "Brief description of the ad content",
            &[],
        ),
    ];

    Schema {
        variables,
        case_transform: CaseTransform::Lowercase,
        separator: "_".to_string(),
        locked: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_schema_is_valid() {
        let schema = example_schema();
        assert_eq!(schema.variables.len(), 8);
        assert!(schema.validate().is_ok());
    }
}
