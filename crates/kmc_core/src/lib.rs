pub mod error;
pub mod state;
pub mod types;

pub use error::{Error, ErrorInfo, ErrorKind, Result};
pub use state::RequestState;
pub use types::{InferenceResult, InputSelection, InputSlot, SelectedFile};

pub mod prelude {
    pub use crate::{Error, ErrorInfo, InferenceResult, InputSelection, RequestState, Result, SelectedFile};
}
