/// Core FIR filter implementation shared by the band-pass and low-pass filters
///
/// Contains the delay line, tap coefficients, and convolution logic.
/// Individual filter types wrap this and provide their own coefficient design
/// via Parks-McClellan. Cloning a freshly designed filter yields an
/// independent instance with a cleared delay line.
#[derive(Debug, Clone)]
pub struct FirFilterCore {
    taps: Vec<f64>,
    delay_line: Vec<f64>,
    pos: usize,
}

impl FirFilterCore {
    /// Create a new FIR filter core with the given tap coefficients
    pub fn new(taps: Vec<f64>) -> Self {
        Self {
            delay_line: vec![0.0; taps.len()],
            taps,
            pos: 0,
        }
    }

    fn process_f64(&mut self, sample: f64) -> f64 {
        self.delay_line[self.pos] = sample;

        let mut output = 0.0f64;
        let n = self.taps.len();

        // Iterate the ring buffer in two contiguous reverse ranges to avoid
        // modulo arithmetic in the inner convolution loop.
        let mut tap_i = 0usize;
        for delay_idx in (0..=self.pos).rev() {
            output += self.taps[tap_i] * self.delay_line[delay_idx];
            tap_i += 1;
        }
        for delay_idx in ((self.pos + 1)..n).rev() {
            output += self.taps[tap_i] * self.delay_line[delay_idx];
            tap_i += 1;
        }
        debug_assert_eq!(tap_i, n);

        self.pos += 1;
        if self.pos == n {
            self.pos = 0;
        }
        output
    }

    /// Filter a whole buffer with the group delay removed
    ///
    /// The input is followed by `group_delay` zeros and the first
    /// `group_delay` outputs are discarded, so output `n` lines up with input
    /// `n` and the result has the input's length. Starts from the current
    /// state; use a fresh instance for independent buffers.
    pub fn filter_aligned(&mut self, input: &[f32]) -> Vec<f32> {
        let delay = self.group_delay_samples();
        let mut output = Vec::with_capacity(input.len());

        let padded = input
            .iter()
            .map(|&x| x as f64)
            .chain(std::iter::repeat_n(0.0, delay));
        for (i, x) in padded.enumerate() {
            let y = self.process_f64(x);
            if i >= delay {
                output.push(y as f32);
            }
        }
        output
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        (self.taps.len() - 1) / 2
    }

    /// Magnitude response at a frequency normalized to the sample rate
    pub fn gain_at(&self, normalized_freq: f64) -> f64 {
        let w = 2.0 * std::f64::consts::PI * normalized_freq;
        let (re, im) = self
            .taps
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(re, im), (k, &h)| {
                let phase = w * k as f64;
                (re + h * phase.cos(), im - h * phase.sin())
            });
        (re * re + im * im).sqrt()
    }
}
