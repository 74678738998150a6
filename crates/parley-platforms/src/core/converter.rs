//! Core output converter: the template passes through, sanitized.

use parley_types::{ConversionWarning, OutputTemplate};

use crate::converter::{ConverterConfig, OutputConverterStrategy, ResolvedOutput};

use super::types::CoreResponse;

/// Key of the Core override block in an output template.
pub const CORE_PLATFORM_NAME: &str = "Core";

#[derive(Debug, Clone, Default)]
pub struct CoreOutputConverter {
    config: ConverterConfig,
}

impl CoreOutputConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }
}

impl OutputConverterStrategy for CoreOutputConverter {
    type Response = CoreResponse;

    fn platform_name(&self) -> &str {
        CORE_PLATFORM_NAME
    }

    fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn render(
        &self,
        output: &ResolvedOutput,
        _warnings: &mut Vec<ConversionWarning>,
    ) -> CoreResponse {
        CoreResponse {
            output: OutputTemplate {
                message: output.message.clone(),
                reprompt: output.reprompt.clone(),
                listen: output.listen.clone(),
                quick_replies: output.quick_replies.clone(),
                card: output.card.clone(),
                platforms: None,
            },
            ..CoreResponse::default()
        }
    }

    fn from_response(&self, response: &CoreResponse) -> OutputTemplate {
        response.output.clone()
    }
}
