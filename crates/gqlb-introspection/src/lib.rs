#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(future_incompatible, unreachable_pub, rust_2018_idioms)]

mod model;
mod request;

pub use model::EnumValueInfo;
pub use model::FieldInfo;
pub use model::FullType;
pub use model::GraphQlError;
pub use model::InputValueInfo;
pub use model::Introspection;
pub use model::NamedType;
pub use model::Response;
pub use model::ResponseError;
pub use model::SchemaInfo;
pub use model::TypeKind;
pub use model::TypeRef;
pub use request::request;
pub use request::QUERY;
