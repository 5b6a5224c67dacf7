//! Built-in framings and canned replies for the two assistants.
//!
//! The platform's audience is Arabic-speaking, so every default here is
//! Arabic. All of them can be overridden from `[assistant]` in the LLM
//! config; these are only the values used when nothing is configured.

use crate::types::ConversationMode;

/// System framing for the programming tutor ("CodeDee").
pub const CODE_HELPER_SYSTEM: &str = r"أنت مساعد برمجي خبير وودود اسمه 'كودي' (CodeDee).
مهمتك هي مساعدة الطلاب الصغار والمبتدئين في تعلم البرمجة.
- خاطب المستخدم دائماً باللغة العربية.
- بسّط المفاهيم المعقدة.
- قدم إجابات واضحة وخطوة بخطوة.
- عند تقديم كود، اشرح كل جزء منه.
- كن صبوراً ومشجعاً دائماً.
- لا تجب عن أي أسئلة غير متعلقة بالبرمجة أو العلوم أو التكنولوجيا. إذا سُئلت عن شيء آخر، أجب بلطف: '{code_off_topic}'.";

/// Reply the tutor is told to give to off-topic questions.
pub const CODE_OFF_TOPIC_REPLY: &str = "أنا هنا لمساعدتك في البرمجة! هل لديك أي سؤال في هذا المجال؟";

/// System framing for the platform guide.
pub const PLATFORM_HELPER_SYSTEM: &str = r"أنت مساعد داخلي لمنصة 'تعلم البرمجة بنفسك'.
مهمتك هي إرشاد المستخدمين حول كيفية استخدام المنصة.
أجب فقط على الأسئلة المتعلقة بـ: الكورسات، الاشتراكات، نظام النقاط، الشهادات، لوحة تحكم الطالب، وكيفية التواصل مع المدرسين.
إذا سُئل المستخدم عن أي شيء آخر، قل بلطف: '{platform_off_topic}'.
استخدم لغة عربية واضحة ومباشرة.";

/// Reply the guide is told to give to off-topic questions.
pub const PLATFORM_OFF_TOPIC_REPLY: &str =
    "أنا هنا لمساعدتك في كل ما يخص منصتنا التعليمية. كيف يمكنني إرشادك اليوم؟";

/// Returned by the platform guide when no credentials are configured.
pub const UNAVAILABLE_MESSAGE: &str = "عذراً, خدمة الذكاء الاصطناعي غير متاحة حالياً.";

/// Returned by the code tutor when no credentials are configured.
pub const CODE_UNAVAILABLE_MESSAGE: &str =
    "عذراً, خدمة الذكاء الاصطناعي غير متاحة حالياً. يرجى التأكد من إعداد مفتاح API.";

/// Appended to the transcript when a call fails or times out.
pub const FALLBACK_MESSAGE: &str =
    "حدث خطأ أثناء محاولة الوصول إلى المساعد الذكي. يرجى المحاولة مرة أخرى لاحقاً.";

/// Render a template, replacing `{key}` placeholders with values.
#[must_use]
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

/// Default system framing for `mode`, with its off-topic reply filled in.
#[must_use]
pub fn default_system(mode: ConversationMode) -> String {
    match mode {
        ConversationMode::Code => {
            render(CODE_HELPER_SYSTEM, &[("code_off_topic", CODE_OFF_TOPIC_REPLY)])
        }
        ConversationMode::Platform => render(
            PLATFORM_HELPER_SYSTEM,
            &[("platform_off_topic", PLATFORM_OFF_TOPIC_REPLY)],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_placeholders() {
        let out = render("hi {name}, {name}!", &[("name", "Sara")]);
        assert_eq!(out, "hi Sara, Sara!");
    }

    #[test]
    fn default_framings_have_no_placeholders_left() {
        for mode in [ConversationMode::Code, ConversationMode::Platform] {
            let system = default_system(mode);
            assert!(!system.contains('{'), "{mode}: {system}");
        }
        assert!(default_system(ConversationMode::Code).contains(CODE_OFF_TOPIC_REPLY));
        assert!(default_system(ConversationMode::Platform).contains(PLATFORM_OFF_TOPIC_REPLY));
    }
}
