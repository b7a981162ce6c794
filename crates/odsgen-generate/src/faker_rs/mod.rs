mod adapter;
mod locales;

pub use adapter::{FakeKind, FakeRsAdapter};
pub use locales::LocaleKey;
