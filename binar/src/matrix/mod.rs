mod bitmatrix;
mod echelon;

pub use bitmatrix::BitMatrix;
pub(crate) use bitmatrix::RowOperation;
pub use echelon::EchelonForm;
