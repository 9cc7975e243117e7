//! TGA run-length packets.
//!
//! A packet header's high bit marks a run (one pixel repeated `n` times);
//! otherwise `n` literal pixels follow. The low seven bits hold `n - 1`.

const MAX_PACKET: usize = 128;
const RUN_FLAG: u8 = 0x80;

/// Appends the run-length encoding of `pixels` to `out`, one scanline of
/// `width` pixels at a time.
pub(super) fn encode(pixels: &[u8], bytes_per_pixel: usize, width: usize, out: &mut Vec<u8>) {
    let row_bytes = width * bytes_per_pixel;
    if row_bytes == 0 {
        return;
    }

    for row in pixels.chunks_exact(row_bytes) {
        let pixel = |i: usize| &row[i * bytes_per_pixel..(i + 1) * bytes_per_pixel];
        let mut i = 0;

        while i < width {
            let mut run = 1;
            while i + run < width && run < MAX_PACKET && pixel(i + run) == pixel(i) {
                run += 1;
            }

            if run > 1 {
                out.push(RUN_FLAG | (run - 1) as u8);
                out.extend_from_slice(pixel(i));
                i += run;
                continue;
            }

            // literals up to the start of the next run
            let start = i;
            i += 1;
            while i < width && i - start < MAX_PACKET && !(i + 1 < width && pixel(i) == pixel(i + 1)) {
                i += 1;
            }
            out.push((i - start - 1) as u8);
            out.extend_from_slice(&row[start * bytes_per_pixel..i * bytes_per_pixel]);
        }
    }
}
