pub mod secret;

pub use secret::{
    normalize_value, unwrap_single_value, wrap_for_write, FlatMap, SecretData, SecretMetadata,
    VersionInfo, VALUE_FIELD,
};
