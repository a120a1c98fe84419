//! Synthetic packet builders shared by unit tests.

use crate::constants::{STUFFING_BYTE, TS_PACKET_SIZE, TS_SYNC_BYTE};
use crate::crc32::compute_crc32;

fn header(pid: u16, pusi: bool, cc: u8) -> [u8; 4] {
    let flags = if pusi { 0x40 } else { 0x00 };
    [
        TS_SYNC_BYTE,
        flags | ((pid >> 8) as u8 & 0x1F),
        pid as u8,
        0x10 | (cc & 0x0F),
    ]
}

/// Wraps a PSI section (table_id onwards, CRC appended here) in a packet
/// with a zero pointer field.
pub fn psi_packet(pid: u16, section_without_crc: &[u8]) -> Vec<u8> {
    let mut pkt = header(pid, true, 0).to_vec();
    pkt.push(0x00);
    pkt.extend_from_slice(section_without_crc);
    pkt.extend_from_slice(&compute_crc32(section_without_crc).to_be_bytes());
    pkt.resize(TS_PACKET_SIZE, STUFFING_BYTE);
    pkt
}

/// PAT listing `(program_number, pid)` entries in order.
pub fn pat_packet(entries: &[(u16, u16)]) -> Vec<u8> {
    let section_length = 5 + entries.len() * 4 + 4;
    let mut s = vec![
        0x00,
        0xB0 | ((section_length >> 8) as u8 & 0x0F),
        section_length as u8,
        0x7F, 0xE1, // transport_stream_id
        0xC1,       // version 0, current
        0x00, 0x00,
    ];
    for &(program_number, pid) in entries {
        s.extend_from_slice(&program_number.to_be_bytes());
        s.push(0xE0 | ((pid >> 8) as u8 & 0x1F));
        s.push(pid as u8);
    }
    psi_packet(0x0000, &s)
}

/// PMT with `(stream_type, pid, es_info)` entries.
pub fn pmt_packet(
    pmt_pid: u16,
    pcr_pid: u16,
    program_info: &[u8],
    streams: &[(u8, u16, &[u8])],
) -> Vec<u8> {
    let loop_len: usize = streams.iter().map(|(_, _, info)| 5 + info.len()).sum();
    let section_length = 9 + program_info.len() + loop_len + 4;
    let mut s = vec![
        0x02,
        0xB0 | ((section_length >> 8) as u8 & 0x0F),
        section_length as u8,
        0x04, 0x08, // program_number
        0xC1,
        0x00, 0x00,
        0xE0 | ((pcr_pid >> 8) as u8 & 0x1F),
        pcr_pid as u8,
        0xF0 | ((program_info.len() >> 8) as u8 & 0x0F),
        program_info.len() as u8,
    ];
    s.extend_from_slice(program_info);
    for &(stream_type, pid, info) in streams {
        s.push(stream_type);
        s.push(0xE0 | ((pid >> 8) as u8 & 0x1F));
        s.push(pid as u8);
        s.push(0xF0 | ((info.len() >> 8) as u8 & 0x0F));
        s.push(info.len() as u8);
        s.extend_from_slice(info);
    }
    psi_packet(pmt_pid, &s)
}

/// Payload-only packet filled with `fill`.
pub fn es_packet(pid: u16, fill: u8) -> Vec<u8> {
    let mut pkt = header(pid, false, fill).to_vec();
    pkt.resize(TS_PACKET_SIZE, fill);
    pkt
}

/// The ARIB-style layout the rewrite expects: network slot, then the program.
pub fn scenario_pat() -> Vec<u8> {
    pat_packet(&[(0x0000, 0x0010), (0x0001, 0x0020), (0x0002, 0x0030)])
}

/// PAT, PMT on 0x0020 (PCR 0x0021, ES 0x0022), ES packet.
pub fn scenario_stream() -> Vec<u8> {
    let mut ts = scenario_pat();
    ts.extend(pmt_packet(0x0020, 0x0021, &[], &[(0x02, 0x0022, &[])]));
    ts.extend(es_packet(0x0022, 0xAA));
    ts
}

pub fn concat(packets: &[Vec<u8>]) -> Vec<u8> {
    packets.iter().flatten().copied().collect()
}
