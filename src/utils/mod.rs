pub mod amount;
pub mod query;

pub use amount::{from_smallest_unit, parse_smallest_unit, to_smallest_unit};
pub use query::{decode_uri_component, get_parameter_by_name, parse_query};
