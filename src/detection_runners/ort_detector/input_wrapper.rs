use ndarray::{Array, ArrayViewD, IxDyn};
use crate::Result;

/// Dense f32 tensor passed across the inference boundary, wrapper over [`Array<f32, IxDyn>`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct X(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for X {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl From<Vec<f32>> for X {
    fn from(x: Vec<f32>) -> Self {
        Self(Array::from_vec(x).into_dyn())
    }
}

impl std::ops::Deref for X {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl X {
    pub fn from_shape_vec(shape: &[usize], xs: Vec<f32>) -> Result<Self> {
        Ok(Self::from(Array::from_shape_vec(shape, xs)?))
    }

    pub fn view_dyn(&self) -> ArrayViewD<'_, f32> {
        self.0.view()
    }

    pub fn ndim(&self) -> usize {
        self.0.ndim()
    }
}
