#![allow(
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

#[cfg(feature = "cma-es")]
mod cma_es;
#[path = "../../benches/test_functions.rs"]
#[allow(dead_code)]
mod test_functions;
