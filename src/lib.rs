//! Run R scripts through `Rscript` and pull tagged variables back as typed
//! Rust values.
//!
//! ```no_run
//! # async fn demo() -> rinterface::Result<()> {
//! use rinterface::{RInterface, RunOptions, Value};
//!
//! let code = "\
//! # @grab{list[float]}
//! means <- colMeans(iris[, 1:4])
//! ";
//! let out = RInterface::from_env().run(code, &RunOptions::grab()).await?;
//! if let Some(Value::FloatList(means)) = out.value("means") {
//!     println!("{means:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod execution;
pub mod grab;
pub mod process;
pub mod value;

pub use config::{Config, RInterfaceConfig};
pub use convert::{to_r, ToR};
pub use error::{Error, Result};
pub use execution::{RInterface, RunOptions, RunOutput};
pub use grab::{scan, GrabTag, GrabType, Grabbed};
pub use value::{Column, ColumnData, DataFrame, NdArray, Value};
