// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 红线: 语言一律显式传入, 不修改 rust-i18n 的全局 locale
// ==========================================

pub const DEFAULT_LOCALE: &str = "en";

/// 已提供翻译文件的语言
pub const SUPPORTED_LOCALES: &[&str] = &["en", "zh-CN"];

pub fn is_supported_locale(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

/// 未支持的语言回退到默认语言
fn effective_locale(locale: &str) -> &str {
    if is_supported_locale(locale) {
        locale
    } else {
        DEFAULT_LOCALE
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use procurement_risk::i18n::t;
/// let msg = t("en", "narrative.agreement");
/// ```
pub fn t(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = effective_locale(locale)).to_string()
}

/// 翻译消息（带参数, 占位符格式 %{name}）
///
/// # 示例
/// ```no_run
/// use procurement_risk::i18n::t_with_args;
/// let msg = t_with_args("en", "narrative.no_schedule_data", &[("name", "Acme")]);
/// ```
pub fn t_with_args(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    interpolate(&t(locale, key), args)
}

/// 单遍替换: 只扫描模板本身, 已代入的参数值不会再被解析
/// 未知占位符原样保留
fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("%{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            return result;
        };

        let name = &after[..end];
        match args.iter().find(|(k, _)| *k == name) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_simple() {
        assert_eq!(t("en", "narrative.agreement"), "Agents in agreement.");
        assert_eq!(t("zh-CN", "narrative.agreement"), "智能体结论一致。");
    }

    #[test]
    fn test_unsupported_locale_falls_back() {
        assert_eq!(t("fr", "narrative.agreement"), "Agents in agreement.");
        assert!(!is_supported_locale("fr"));
    }

    #[test]
    fn test_translate_with_args() {
        let msg = t_with_args("en", "narrative.no_schedule_data", &[("name", "Acme Steel")]);
        assert_eq!(msg, "No equipment schedule data available for Acme Steel.");

        let msg = t_with_args("zh-CN", "narrative.no_schedule_data", &[("name", "Acme Steel")]);
        assert!(msg.contains("Acme Steel"));
        assert!(msg.contains("暂无"));
    }

    #[test]
    fn test_argument_values_are_not_reinterpolated() {
        let msg = interpolate(
            "%{materials} -> %{name}",
            &[("materials", "Grade %{name} steel"), ("name", "Osaka Precision")],
        );
        assert_eq!(msg, "Grade %{name} steel -> Osaka Precision");
    }

    #[test]
    fn test_unknown_and_unterminated_placeholders_kept() {
        assert_eq!(interpolate("a %{missing} b", &[("x", "1")]), "a %{missing} b");
        assert_eq!(interpolate("50%{ open", &[]), "50%{ open");
        assert_eq!(interpolate("100% done", &[]), "100% done");
    }
}
