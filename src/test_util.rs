use crate::ekn::decode::grid_length;

/// Little-endian f32 payload holding `values` in order.
pub fn payload(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Full-year payload where slot `i` holds `i` (exact in f32 for a whole year).
pub fn ramp_payload(year: i16) -> Vec<u8> {
    let len = grid_length(year).unwrap();
    let values: Vec<f32> = (0..len).map(|i| i as f32).collect();
    payload(&values)
}
