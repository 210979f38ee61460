//! Reader for feature descriptor files.
//!
//! Feature descriptors use the bnd property layout: one header per line,
//! `name=value` or `name: value`, `#` comments and `\` line continuations.
//!
//! ```text
//! symbolicName=io.openliberty.restfulWS-3.0
//! visibility=public
//! IBM-ShortName: restfulWS-3.0
//! -features=io.openliberty.servlet-5.0, \
//!   com.ibm.websphere.appserver.eeCompatible-9.0; ibm.tolerates:="10.0"
//! kind=ga
//! edition=core
//! ```
//!
//! Header values that hold lists are read with [`Manifest::clauses`], which
//! splits them into [`Clause`]s carrying an [`Attrs`] bag.

mod clause;
mod error;
mod manifest;

pub use clause::{Attrs, Clause, parse_clauses};
pub use error::{ManifestError, ManifestResult};
pub use manifest::Manifest;
