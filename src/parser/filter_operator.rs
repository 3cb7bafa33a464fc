/// Operators of the flat filter grammar
///
/// A raw filter value carries its operator as a leading symbol, e.g. `!*Jo`
/// or `::50,60`. Detection walks [`FilterOperator::DETECTION_ORDER`] and the
/// first operator whose symbol prefixes the value wins, so longer symbols that
/// share a first character (`!*`, `!:`, `::`, `>=`) are listed before the
/// shorter ones they would otherwise be shadowed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Like,
    NotLike,
    Between,
    NotIn,
    In,
    GreaterOrEqual,
    LessOrEqual,
    GreaterThan,
    LessThan,
    NotEquals,
    Equals,
}

impl FilterOperator {
    pub const DETECTION_ORDER: [FilterOperator; 11] = [
        FilterOperator::Like,
        FilterOperator::NotLike,
        FilterOperator::Between,
        FilterOperator::NotIn,
        FilterOperator::In,
        FilterOperator::GreaterOrEqual,
        FilterOperator::LessOrEqual,
        FilterOperator::GreaterThan,
        FilterOperator::LessThan,
        FilterOperator::NotEquals,
        FilterOperator::Equals,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOperator::Like => "*",
            FilterOperator::NotLike => "!*",
            FilterOperator::Between => "::",
            FilterOperator::NotIn => "!:",
            FilterOperator::In => ":",
            FilterOperator::GreaterOrEqual => ">=",
            FilterOperator::LessOrEqual => "<=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::LessThan => "<",
            FilterOperator::NotEquals => "!",
            FilterOperator::Equals => "",
        }
    }

    /// Strict prefix match. `Equals` has an empty symbol and always matches.
    pub fn matches(&self, raw_value: &str) -> bool {
        raw_value.starts_with(self.symbol())
    }

    /// The raw value with this operator's symbol stripped
    pub fn residual<'a>(&self, raw_value: &'a str) -> &'a str {
        raw_value.strip_prefix(self.symbol()).unwrap_or(raw_value)
    }

    /// Split a raw value into its operator and residual value
    pub fn detect(raw_value: &str) -> (FilterOperator, &str) {
        let operator = Self::DETECTION_ORDER
            .into_iter()
            .find(|op| op.matches(raw_value))
            .unwrap_or(FilterOperator::Equals);
        (operator, operator.residual(raw_value))
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            FilterOperator::GreaterOrEqual
                | FilterOperator::LessOrEqual
                | FilterOperator::GreaterThan
                | FilterOperator::LessThan
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_each_operator() {
        let cases = [
            ("John", FilterOperator::Equals, "John"),
            ("!John", FilterOperator::NotEquals, "John"),
            ("*Jo", FilterOperator::Like, "Jo"),
            ("!*Jo", FilterOperator::NotLike, "Jo"),
            (">=50", FilterOperator::GreaterOrEqual, "50"),
            ("<=50", FilterOperator::LessOrEqual, "50"),
            (">50", FilterOperator::GreaterThan, "50"),
            ("<50", FilterOperator::LessThan, "50"),
            (":Drama,Horror", FilterOperator::In, "Drama,Horror"),
            ("!:Drama", FilterOperator::NotIn, "Drama"),
            ("::50,60", FilterOperator::Between, "50,60"),
        ];

        for (raw, operator, residual) in cases {
            assert_eq!(FilterOperator::detect(raw), (operator, residual), "raw: {}", raw);
        }
    }

    #[test]
    fn test_symbol_inside_value_is_not_an_operator() {
        assert_eq!(
            FilterOperator::detect("Hello!World"),
            (FilterOperator::Equals, "Hello!World")
        );
        assert_eq!(
            FilterOperator::detect("a:b"),
            (FilterOperator::Equals, "a:b")
        );
    }

    #[test]
    fn test_empty_value_is_equals() {
        assert_eq!(FilterOperator::detect(""), (FilterOperator::Equals, ""));
    }

    #[test]
    fn test_only_first_symbol_is_stripped() {
        assert_eq!(
            FilterOperator::detect("!!x"),
            (FilterOperator::NotEquals, "!x")
        );
    }
}
