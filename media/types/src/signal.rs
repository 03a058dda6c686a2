/*!
    Pipeline control signals.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Error, Result};

/**
    Decision returned by a pipeline handler.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Keep going.
    #[default]
    Continue,
    /**
        Halt the pipeline.

        Stopping is not an error; the pipeline returns
        [`Termination::Stopped`].
    */
    Stop,
}

impl Flow {
    pub const fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}

/**
    Why a pipeline finished without error.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Termination {
    /**
        Every stream was drained and flushed.
    */
    EndOfStream,
    /**
        A handler returned [`Flow::Stop`].
    */
    Stopped,
}

/**
    Cooperative cancellation shared between a pipeline and its controller.

    Cloning yields a handle to the same flag. Pipelines check the token
    before every native read and report [`Error::Cancelled`] once it is set.
*/
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Request cancellation. Idempotent.
    */
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /**
        Returns [`Error::Cancelled`] if cancellation was requested.
    */
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

static_assertions::assert_impl_all!(CancelToken: Send, Sync, Clone);
