//! Wire formats shared by the query facade and the store clients

mod query_string;
mod response;

pub use query_string::{build, build_query_string, parse_query_string, query_params, view_path};
pub use response::{ErrorBody, ViewResponse, ViewRow};
