//! csv loan tapes in, csv report tables out
pub mod reader;
pub mod writer;

pub use reader::{read_loan_tape, read_loan_tape_path, LoanTape};
pub use writer::{write_report, write_report_path};
