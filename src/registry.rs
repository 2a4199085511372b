//! Chat model registry and endpoint resolution

use super::{message::ChatRequest, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability class of a chat model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    /// Plain chat: messages and sampling parameters only
    Base,
    /// ERNIE-Bot tier: function calling and plugin token accounting
    Extended,
}

impl ModelFamily {
    /// Whether requests may declare `functions`
    pub fn supports_functions(&self) -> bool {
        matches!(self, ModelFamily::Extended)
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFamily::Base => f.write_str("base"),
            ModelFamily::Extended => f.write_str("extended"),
        }
    }
}

/// Chat models served from the public Wenxin Workshop endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChatModel {
    #[serde(rename = "ERNIE-Bot-4")]
    ErnieBot4,
    #[serde(rename = "ERNIE-Bot-8K")]
    ErnieBot8K,
    #[default]
    #[serde(rename = "ERNIE-Bot")]
    ErnieBot,
    #[serde(rename = "ERNIE-Bot-turbo")]
    ErnieBotTurbo,
    #[serde(rename = "EB-turbo-AppBuilder")]
    EbTurboAppBuilder,
    #[serde(rename = "Yi-34B-Chat")]
    Yi34BChat,
    #[serde(rename = "BLOOMZ-7B")]
    Bloomz7B,
    #[serde(rename = "Qianfan-BLOOMZ-7B-compressed")]
    QianfanBloomz7BCompressed,
    #[serde(rename = "Llama-2-7b-chat")]
    Llama2_7BChat,
    #[serde(rename = "Llama-2-13b-chat")]
    Llama2_13BChat,
    #[serde(rename = "Llama-2-70b-chat")]
    Llama2_70BChat,
    #[serde(rename = "Qianfan-Chinese-Llama-2-7B")]
    QianfanChineseLlama2_7B,
    #[serde(rename = "Qianfan-Chinese-Llama-2-13B")]
    QianfanChineseLlama2_13B,
    #[serde(rename = "ChatGLM2-6B-32K")]
    ChatGlm2_6B32K,
    #[serde(rename = "XuanYuan-70B-Chat-4bit")]
    XuanYuan70BChat4Bit,
    #[serde(rename = "ChatLaw")]
    ChatLaw,
    #[serde(rename = "AquilaChat-7B")]
    AquilaChat7B,
}

impl ChatModel {
    /// Every registered model, in registry order
    pub const ALL: [ChatModel; 17] = [
        ChatModel::ErnieBot4,
        ChatModel::ErnieBot8K,
        ChatModel::ErnieBot,
        ChatModel::ErnieBotTurbo,
        ChatModel::EbTurboAppBuilder,
        ChatModel::Yi34BChat,
        ChatModel::Bloomz7B,
        ChatModel::QianfanBloomz7BCompressed,
        ChatModel::Llama2_7BChat,
        ChatModel::Llama2_13BChat,
        ChatModel::Llama2_70BChat,
        ChatModel::QianfanChineseLlama2_7B,
        ChatModel::QianfanChineseLlama2_13B,
        ChatModel::ChatGlm2_6B32K,
        ChatModel::XuanYuan70BChat4Bit,
        ChatModel::ChatLaw,
        ChatModel::AquilaChat7B,
    ];

    /// Vendor-facing model name
    pub fn name(&self) -> &'static str {
        match self {
            ChatModel::ErnieBot4 => "ERNIE-Bot-4",
            ChatModel::ErnieBot8K => "ERNIE-Bot-8K",
            ChatModel::ErnieBot => "ERNIE-Bot",
            ChatModel::ErnieBotTurbo => "ERNIE-Bot-turbo",
            ChatModel::EbTurboAppBuilder => "EB-turbo-AppBuilder",
            ChatModel::Yi34BChat => "Yi-34B-Chat",
            ChatModel::Bloomz7B => "BLOOMZ-7B",
            ChatModel::QianfanBloomz7BCompressed => "Qianfan-BLOOMZ-7B-compressed",
            ChatModel::Llama2_7BChat => "Llama-2-7b-chat",
            ChatModel::Llama2_13BChat => "Llama-2-13b-chat",
            ChatModel::Llama2_70BChat => "Llama-2-70b-chat",
            ChatModel::QianfanChineseLlama2_7B => "Qianfan-Chinese-Llama-2-7B",
            ChatModel::QianfanChineseLlama2_13B => "Qianfan-Chinese-Llama-2-13B",
            ChatModel::ChatGlm2_6B32K => "ChatGLM2-6B-32K",
            ChatModel::XuanYuan70BChat4Bit => "XuanYuan-70B-Chat-4bit",
            ChatModel::ChatLaw => "ChatLaw",
            ChatModel::AquilaChat7B => "AquilaChat-7B",
        }
    }

    /// Endpoint path segment under `<api_base>/chat/`
    pub fn endpoint(&self) -> &'static str {
        match self {
            ChatModel::ErnieBot4 => "completions_pro",
            ChatModel::ErnieBot8K => "ernie_bot_8k",
            ChatModel::ErnieBot => "completions",
            ChatModel::ErnieBotTurbo => "eb-instant",
            ChatModel::EbTurboAppBuilder => "ai_apaas",
            ChatModel::Yi34BChat => "yi_34b_chat",
            ChatModel::Bloomz7B => "bloomz_7b1",
            ChatModel::QianfanBloomz7BCompressed => "qianfan_bloomz_7b_compressed",
            ChatModel::Llama2_7BChat => "llama_2_7b",
            ChatModel::Llama2_13BChat => "llama_2_13b",
            ChatModel::Llama2_70BChat => "llama_2_70b",
            ChatModel::QianfanChineseLlama2_7B => "qianfan_chinese_llama_2_7b",
            ChatModel::QianfanChineseLlama2_13B => "qianfan_chinese_llama_2_13b",
            ChatModel::ChatGlm2_6B32K => "chatglm2_6b_32k",
            ChatModel::XuanYuan70BChat4Bit => "xuanyuan_70b_chat",
            ChatModel::ChatLaw => "chatlaw",
            ChatModel::AquilaChat7B => "aquilachat_7b",
        }
    }

    /// Capability class of this model
    pub fn family(&self) -> ModelFamily {
        match self {
            ChatModel::ErnieBot4 | ChatModel::ErnieBot8K | ChatModel::ErnieBot => {
                ModelFamily::Extended
            }
            _ => ModelFamily::Base,
        }
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChatModel {
    type Err = Error;

    /// Parse a vendor model name; matching ignores ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        ChatModel::ALL
            .iter()
            .copied()
            .find(|model| model.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Config(format!("Unknown chat model: {}", s)))
    }
}

/// Resolve the endpoint segment for a chat call.
///
/// A non-empty `endpoint_override` is returned verbatim; otherwise the
/// registered endpoint of `model` is used.
pub fn resolve_endpoint<'a>(model: ChatModel, endpoint_override: Option<&'a str>) -> &'a str {
    match endpoint_override {
        Some(endpoint) if !endpoint.is_empty() => endpoint,
        _ => model.endpoint(),
    }
}

/// Resolve the endpoint for `request` against `model`, rejecting requests
/// the model family or this client cannot serve.
pub(crate) fn resolve_chat_endpoint<'a>(
    model: ChatModel,
    endpoint_override: Option<&'a str>,
    request: &ChatRequest,
) -> Result<&'a str> {
    if request.stream == Some(true) {
        return Err(Error::Unsupported(
            "streaming responses are not supported; leave `stream` unset".to_string(),
        ));
    }
    if !request.functions.is_empty() && !model.family().supports_functions() {
        return Err(Error::Unsupported(format!(
            "{} ({} family) does not support function calling",
            model,
            model.family()
        )));
    }
    Ok(resolve_endpoint(model, endpoint_override))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Function, Message};

    #[test]
    fn test_default_model_is_ernie_bot() {
        assert_eq!(ChatModel::default(), ChatModel::ErnieBot);
        assert_eq!(ChatModel::default().endpoint(), "completions");
    }

    #[test]
    fn test_resolve_without_override() {
        assert_eq!(resolve_endpoint(ChatModel::ErnieBot4, None), "completions_pro");
        assert_eq!(resolve_endpoint(ChatModel::ErnieBotTurbo, None), "eb-instant");
        // Pure: repeated resolution yields the same segment
        assert_eq!(
            resolve_endpoint(ChatModel::Llama2_70BChat, None),
            resolve_endpoint(ChatModel::Llama2_70BChat, None)
        );
    }

    #[test]
    fn test_resolve_override_is_verbatim() {
        for model in ChatModel::ALL {
            assert_eq!(resolve_endpoint(model, Some("my_deploy/v2")), "my_deploy/v2");
        }
    }

    #[test]
    fn test_empty_override_falls_back_to_registry() {
        assert_eq!(resolve_endpoint(ChatModel::ChatLaw, Some("")), "chatlaw");
    }

    #[test]
    fn test_endpoints_are_unique() {
        let mut endpoints: Vec<_> = ChatModel::ALL.iter().map(|m| m.endpoint()).collect();
        endpoints.sort_unstable();
        endpoints.dedup();
        assert_eq!(endpoints.len(), ChatModel::ALL.len());
    }

    #[test]
    fn test_name_round_trips_through_from_str() {
        for model in ChatModel::ALL {
            assert_eq!(model.name().parse::<ChatModel>().unwrap(), model);
        }
        assert_eq!("ernie-bot-turbo".parse::<ChatModel>().unwrap(), ChatModel::ErnieBotTurbo);
        assert!("GPT-4".parse::<ChatModel>().is_err());
    }

    #[test]
    fn test_serde_uses_vendor_names() {
        let json = serde_json::to_string(&ChatModel::QianfanBloomz7BCompressed).unwrap();
        assert_eq!(json, "\"Qianfan-BLOOMZ-7B-compressed\"");
        let model: ChatModel = serde_json::from_str("\"Yi-34B-Chat\"").unwrap();
        assert_eq!(model, ChatModel::Yi34BChat);
    }

    #[test]
    fn test_model_families() {
        assert_eq!(ChatModel::ErnieBot4.family(), ModelFamily::Extended);
        assert_eq!(ChatModel::ErnieBot.family(), ModelFamily::Extended);
        assert_eq!(ChatModel::ErnieBotTurbo.family(), ModelFamily::Base);
        assert!(!ChatModel::Bloomz7B.family().supports_functions());
        assert!(ChatModel::ErnieBot8K.family().supports_functions());
    }

    #[test]
    fn test_stream_requests_are_rejected() {
        let mut request = ChatRequest::new(vec![Message::user("hi")]);
        request.stream = Some(true);
        let err = resolve_chat_endpoint(ChatModel::ErnieBot, None, &request).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));

        request.stream = Some(false);
        assert_eq!(resolve_chat_endpoint(ChatModel::ErnieBot, None, &request).unwrap(), "completions");
    }

    #[test]
    fn test_functions_need_extended_family() {
        let request = ChatRequest::new(vec![Message::user("weather?")]).function(Function::new(
            "get_weather",
            "current weather",
            serde_json::json!({"type": "object", "properties": {}}),
        ));
        assert_eq!(
            resolve_chat_endpoint(ChatModel::ErnieBot4, None, &request).unwrap(),
            "completions_pro"
        );
        let err = resolve_chat_endpoint(ChatModel::Llama2_7BChat, Some("custom"), &request).unwrap_err();
        assert!(err.to_string().contains("Llama-2-7b-chat"));
    }
}
