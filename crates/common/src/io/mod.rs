mod csrrg;
mod vbyte;

use clap::ValueEnum;
pub use csrrg::read_csrrg;
pub use csrrg::write_csrrg_binary;
pub use csrrg::write_csrrg_text;
pub use csrrg::CsrrgLayout;
pub use csrrg::ReadCsrrgError;
pub use csrrg::WriteCsrrgError;
pub use vbyte::decode_vbyte;
pub use vbyte::encode_vbyte;
pub use vbyte::SECTION_SENTINEL;

#[derive(Debug, Clone, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Binary,
    Both,
}
