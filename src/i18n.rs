// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和阿拉伯文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 接口信封同时携带的两种语言
pub const LOCALE_EN: &str = "en";
pub const LOCALE_AR: &str = "ar";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" 或 "ar"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（当前语言，无参数）
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（当前语言，带参数）
///
/// # 示例
/// ```no_run
/// use card_import::i18n::t_with_args;
/// let msg = t_with_args("import.unsupported_format", &[("ext", "txt")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    t_in(&current_locale(), key, args)
}

/// 翻译消息（指定语言，不修改全局语言设置）
pub fn t_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key, locale = locale).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale(LOCALE_AR);
        assert_eq!(current_locale(), "ar");

        set_locale(LOCALE_EN);
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale(LOCALE_EN);
        assert_eq!(t("import.empty_input"), "File is empty");

        set_locale(LOCALE_AR);
        assert_eq!(t("import.empty_input"), "الملف فارغ");

        set_locale(LOCALE_EN);
    }

    #[test]
    fn test_translate_in_locale_with_args() {
        let msg = t_in(
            LOCALE_EN,
            "import.success",
            &[("added", "3"), ("skipped", "1")],
        );
        assert_eq!(msg, "Cards imported successfully. Added: 3, Skipped: 1");

        let msg = t_in(LOCALE_AR, "import.success", &[("added", "3"), ("skipped", "1")]);
        assert!(msg.contains('3'));
        assert!(!msg.contains("%{added}"));
    }
}
