use std::sync::Arc;
use parking_lot::Mutex;
use crate::common::ModelIoSpec;
use crate::data::X;
use crate::Result;

/// The model execution boundary: one normalized input tensor in, raw output tensors out.
///
/// `infer` takes `&mut self`, so a gateway instance serves one call at a
/// time. Implementations may keep scratch buffers between calls but must
/// reset them inside `infer`. The call blocks until the backend returns.
pub trait InferenceGateway {
    /// Shapes of the loaded model, fixed at load time.
    fn io_spec(&self) -> ModelIoSpec;

    fn infer(&mut self, input: &X) -> Result<Vec<X>>;

    /// Class names stored with the model, if it carries any.
    fn class_names(&self) -> Option<Vec<String>> {
        None
    }
}

impl<G: InferenceGateway + ?Sized> InferenceGateway for Box<G> {
    fn io_spec(&self) -> ModelIoSpec {
        (**self).io_spec()
    }

    fn infer(&mut self, input: &X) -> Result<Vec<X>> {
        (**self).infer(input)
    }

    fn class_names(&self) -> Option<Vec<String>> {
        (**self).class_names()
    }
}

/// A gateway shared between several pipelines, possibly on different threads.
///
/// Every `infer` holds the lock for the whole call, so at most one inference
/// is in flight on the underlying instance.
pub struct SharedGateway<G> {
    inner: Arc<Mutex<G>>,
    io_spec: ModelIoSpec,
}

impl<G> Clone for SharedGateway<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            io_spec: self.io_spec,
        }
    }
}

impl<G: InferenceGateway> SharedGateway<G> {
    pub fn new(gateway: G) -> Self {
        let io_spec = gateway.io_spec();
        Self {
            inner: Arc::new(Mutex::new(gateway)),
            io_spec,
        }
    }

    /// Runs `f` with exclusive access to the wrapped gateway.
    pub fn with_inner<R>(&self, f: impl FnOnce(&mut G) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}

impl<G: InferenceGateway> InferenceGateway for SharedGateway<G> {
    fn io_spec(&self) -> ModelIoSpec {
        self.io_spec
    }

    fn infer(&mut self, input: &X) -> Result<Vec<X>> {
        self.inner.lock().infer(input)
    }

    fn class_names(&self) -> Option<Vec<String>> {
        self.inner.lock().class_names()
    }
}
