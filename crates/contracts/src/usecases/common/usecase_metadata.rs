/// Идентификация UseCase в логах и ответах API
pub trait UseCaseMetadata {
    /// Индекс, например "u501"
    const INDEX: &'static str;
    /// Техническое имя, например "calculate_commissions"
    const NAME: &'static str;
    const DISPLAY_NAME: &'static str;
    const DESCRIPTION: &'static str = "";

    /// "u501_calculate_commissions"
    fn full_name() -> String {
        format!("{}_{}", Self::INDEX, Self::NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample;

    impl UseCaseMetadata for Sample {
        const INDEX: &'static str = "u999";
        const NAME: &'static str = "sample";
        const DISPLAY_NAME: &'static str = "Проверка";
    }

    #[test]
    fn test_full_name() {
        assert_eq!(Sample::full_name(), "u999_sample");
        assert_eq!(Sample::DESCRIPTION, "");
    }
}
