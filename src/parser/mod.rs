pub mod filter_operator;
pub mod filter_parser;
pub mod query_params;
pub mod resource_type;
pub mod sort_parser;

pub use filter_operator::FilterOperator;
pub use filter_parser::{parse_filter_value, FilterValue, Operand, ParsedFilter};
pub use query_params::{CatalogQuery, RawFilter};
pub use resource_type::ResourceType;
pub use sort_parser::{SortOrder, SortSpec};
