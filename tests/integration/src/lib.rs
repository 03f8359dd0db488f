//! Test-only crate; all coverage lives in `tests/`.
