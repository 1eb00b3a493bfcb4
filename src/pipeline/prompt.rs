// Prompt assembly for the chat pipeline
// A fixed per-language system prompt, an optional caller-supplied context
// block, then the conversation history rendered as role-labeled lines and a
// reply cue. The output of this module is the exact string handed to the
// text generator.

use crate::models::{ChatRequest, ChatRole, ChatTurn, Language};

use super::PipelineError;

const SYSTEM_PROMPT_EN: &str = "\
You are Mirsal, the assistant of an AI automation platform. Answer briefly \
and helpfully in English. You help visitors understand workflow automation, \
pricing and integrations. When useful, end your reply with a line starting \
with \"Suggestions:\" followed by up to 3 short quick replies separated by \
commas.";

const SYSTEM_PROMPT_AR: &str = "\
أنت مرسال، مساعد منصة أتمتة تعمل بالذكاء الاصطناعي. أجب بإيجاز وبشكل مفيد \
باللغة العربية. ساعد الزوار على فهم أتمتة سير العمل والأسعار والتكاملات. \
عند الحاجة، اختم ردك بسطر يبدأ بكلمة \"اقتراحات:\" متبوعاً بثلاثة ردود \
سريعة قصيرة على الأكثر مفصولة بفواصل.";

/// System prompt for the requested language, with the free-text context
/// block appended when the caller supplied one.
pub fn system_prompt(language: Language, context: Option<&str>) -> String {
    let base = match language {
        Language::En => SYSTEM_PROMPT_EN,
        Language::Ar => SYSTEM_PROMPT_AR,
    };
    match context {
        Some(extra) if !extra.trim().is_empty() => {
            format!("{}\n\nAdditional context:\n{}", base, extra.trim())
        }
        _ => base.to_string(),
    }
}

/// Flatten the conversation history into role-labeled lines, in order.
pub fn render_transcript(turns: &[ChatTurn]) -> String {
    let mut transcript = String::new();
    for turn in turns {
        let label = match turn.role {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        };
        transcript.push_str(label);
        transcript.push_str(": ");
        transcript.push_str(&turn.content);
        transcript.push('\n');
    }
    transcript
}

/// Full prompt: system prompt, transcript, reply cue.
pub fn build_prompt(request: &ChatRequest) -> String {
    format!(
        "{}\n\n{}Assistant:",
        system_prompt(request.language, request.context.as_deref()),
        render_transcript(&request.messages)
    )
}

/// The single user-facing message for a failed request, in the request's
/// declared language. Provider detail never reaches the caller; it is only
/// logged server-side.
pub fn localized_error(language: Language, error: &PipelineError) -> String {
    match (error, language) {
        (PipelineError::MissingCredential, Language::En) => {
            "The assistant is not configured yet. Please try again later.".to_string()
        }
        (PipelineError::MissingCredential, Language::Ar) => {
            "لم يتم إعداد المساعد بعد. يرجى المحاولة لاحقاً.".to_string()
        }
        (PipelineError::InvalidRequest(_), Language::En) => {
            "The request must end with a message from the user.".to_string()
        }
        (PipelineError::InvalidRequest(_), Language::Ar) => {
            "يجب أن ينتهي الطلب برسالة من المستخدم.".to_string()
        }
        (PipelineError::RateLimited, Language::En) => {
            "You are sending messages too quickly. Please slow down and try again shortly."
                .to_string()
        }
        (PipelineError::RateLimited, Language::Ar) => {
            "أنت ترسل الرسائل بسرعة كبيرة. يرجى التمهل والمحاولة بعد قليل.".to_string()
        }
        (PipelineError::Provider(_), Language::En) => {
            "Sorry, something went wrong while generating a reply. Please try again.".to_string()
        }
        (PipelineError::Provider(_), Language::Ar) => {
            "عذراً، حدث خطأ أثناء إنشاء الرد. يرجى المحاولة مرة أخرى.".to_string()
        }
    }
}
