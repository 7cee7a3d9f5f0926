pub use tabula_array::*;
pub use tabula_verbs::*;
pub use {
    tabula_dtype as dtype, tabula_error as error, tabula_expr as expr, tabula_mask as mask,
    tabula_scalar as scalar,
};
