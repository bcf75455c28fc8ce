pub mod openai;

use anyhow::Result;

use crate::domain::models::GatewayBox;

pub struct GatewayManager {}

impl GatewayManager {
    pub fn get() -> Result<GatewayBox> {
        return Ok(Box::<openai::OpenAiGateway>::default());
    }
}
