//! System prompt rendering.

use crate::types::{BuiltPrompt, Persona, PromptDefinition};
use scholar_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Render the system prompt for a persona.
///
/// The template sees `mode` (lowercase, e.g. "concise") and `interest`.
///
/// # Example
/// ```no_run
/// use scholar_prompt::{build_system_prompt, default_prompt, Persona};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let built = build_system_prompt(&default_prompt(), &Persona::default())?;
/// println!("{}", built.system);
/// # Ok(())
/// # }
/// ```
pub fn build_system_prompt(
    definition: &PromptDefinition,
    persona: &Persona,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building system prompt: {}", definition.id);

    let mut variables = HashMap::new();
    variables.insert("mode".to_string(), persona.mode.as_str().to_string());
    variables.insert("interest".to_string(), persona.interest.clone());

    let system = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(system, definition.id.clone(), variables))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::default_prompt;
    use crate::types::ResponseMode;

    #[test]
    fn test_default_prompt_renders_persona() {
        let persona = Persona::new(ResponseMode::Detailed, "F1");
        let built = build_system_prompt(&default_prompt(), &persona).unwrap();

        assert_eq!(
            built.system,
            "You are a friendly learning assistant. Provide detailed answers with examples related to F1."
        );
        assert_eq!(built.metadata.source_prompt_id, "tutor.system");
        assert_eq!(built.metadata.resolved_variables["mode"], "detailed");
    }

    #[test]
    fn test_interest_is_not_html_escaped() {
        let persona = Persona::new(ResponseMode::Concise, "Rock & Roll");
        let built = build_system_prompt(&default_prompt(), &persona).unwrap();
        assert!(built.system.contains("Rock & Roll"));
    }

    #[test]
    fn test_malformed_template_is_prompt_error() {
        let mut def = default_prompt();
        def.template = "{{#if mode}}unclosed".to_string();

        let err = build_system_prompt(&def, &Persona::default()).unwrap_err();
        assert!(matches!(err, AppError::Prompt(_)));
    }

    #[test]
    fn test_render_template_missing_variable() {
        let vars = HashMap::new();
        // Handlebars renders missing variables as empty string
        assert_eq!(render_template("Hi {{missing}}", &vars).unwrap(), "Hi ");
    }
}
