//! Constants for MPEG-TS packet layout and PSI field offsets

/// MPEG-TS packet constants
pub const TS_PACKET_SIZE: usize = 188;
pub const TS_SYNC_BYTE: u8 = 0x47;
/// 4-byte TS header plus the PSI pointer field
pub const TS_HEADER_SIZE: usize = 5;

/// PID constants
pub const PAT_PID: u16 = 0x0000;
pub const MAX_PID: u16 = 0x1FFF;

/// Filler for unused section bytes
pub const STUFFING_BYTE: u8 = 0xFF;

/// CRC-32/MPEG-2 parameters
pub const CRC32_POLYNOMIAL: u32 = 0x04C1_1DB7;
pub const CRC32_INIT: u32 = 0xFFFF_FFFF;
pub const CRC_SIZE: usize = 4;

/// PAT rewrite
pub const PAT_SECTION_OFFSET: usize = TS_HEADER_SIZE;   // table_id
pub const PAT_FIRST_PROGRAM_NUMBER_OFFSET: usize = 13;  // program_number of the first loop slot
pub const PAT_PROGRAM_PID_OFFSET: usize = 19;           // PID of the program slot after the network slot
pub const PAT_COPY_LEN: usize = 16;                     // header (8) + two loop slots (8)
pub const PAT_LENGTH_LOW_INDEX: usize = 2;              // inside the copied buffer
pub const SINGLE_PROGRAM_SECTION_LENGTH: u8 = 0x11;     // 5 + 8 + CRC
pub const REWRITTEN_PAT_SIZE: usize = TS_PACKET_SIZE - TS_HEADER_SIZE;

/// PMT field offsets (pointer field assumed zero)
pub const PMT_SECTION_LENGTH_OFFSET: usize = 6;
pub const PMT_PCR_PID_OFFSET: usize = 13;
pub const PMT_PROGRAM_INFO_LENGTH_OFFSET: usize = 15;
pub const PMT_LOOP_BASE: usize = 16 + 1;
/// Bytes of the section that precede the counted section length
pub const PMT_SECTION_PREFIX: usize = 8;
/// stream_type + PID + ES_info_length
pub const PMT_ENTRY_HEADER_LEN: usize = 5;

/// Elementary streams flagged with this stream type are not extracted
pub const EXCLUDED_STREAM_TYPE: u8 = 0x0D;

/// Suffix inserted into derived output file names
pub const OUTPUT_SUFFIX: &str = "_tspick";
