use std::f32::consts::PI;

// Animation constants
const POINTER_SMOOTHING: f32 = 0.1; // Easing factor for the tracked pointer
const POINT_SMOOTHING: f32 = 0.08; // Easing factor for per-point motion
const POINTER_FALLOFF: f32 = 400.0; // Radius of pointer-driven displacement, in pixels
const POINTER_MAGNITUDE: f32 = 120.0; // Peak pointer-driven displacement, in pixels
const POINTS_PER_PIXEL: f32 = 1.0 / 12.0; // Sample grid density

/// One sample of a wave line: fixed x, resting y, smoothed rendered y.
#[derive(Debug, Clone, Copy)]
pub struct WavePoint {
    pub x: f32,
    pub base_y: f32,
    pub current_y: f32,
}

/// A single animated line. Shape parameters are derived from the line index
/// at construction and survive resizes; only the point grid is rebuilt.
#[derive(Debug, Clone)]
pub struct Wave {
    pub amplitude: f32,
    pub frequency: f32,
    pub speed: f32,
    pub offset: f32,
    pub phase: f32,
    pub stroke_opacity: f32,
    pub points: Vec<WavePoint>,
}

impl Wave {
    fn new(index: usize, wave_count: usize, width: f32, height: f32) -> Self {
        let i = index as f32;
        let mut wave = Self {
            amplitude: 40.0 + i * 20.0,
            frequency: 0.008 + i * 0.003,
            speed: 0.015 + i * 0.008,
            offset: i * 2.0 * PI / wave_count.max(1) as f32,
            phase: 0.0,
            stroke_opacity: (0.08 - i * 0.02).max(0.0),
            points: Vec::new(),
        };
        wave.rebuild_points(width, height);
        wave
    }

    /// Regenerate the sample grid for new viewport dimensions. Resolution is
    /// proportional to width; shape parameters and phase are untouched.
    fn rebuild_points(&mut self, width: f32, height: f32) {
        let resolution = ((width * POINTS_PER_PIXEL).floor() as usize).max(2);
        let baseline = height / 2.0;
        self.points = (0..=resolution)
            .map(|i| {
                let x = width / resolution as f32 * i as f32;
                WavePoint {
                    x,
                    base_y: baseline,
                    current_y: baseline,
                }
            })
            .collect();
    }
}

/// Decorative waveform state: a handful of sinusoidal lines displaced by the
/// smoothed pointer position. Purely cosmetic; nothing here feeds back into
/// the transcription flow.
#[derive(Debug, Clone)]
pub struct WaveField {
    waves: Vec<Wave>,
    width: f32,
    height: f32,
    pointer: (f32, f32),
    target_pointer: (f32, f32),
}

impl WaveField {
    pub fn new(width: f32, height: f32, wave_count: usize) -> Self {
        let center = (width / 2.0, height / 2.0);
        Self {
            waves: (0..wave_count)
                .map(|i| Wave::new(i, wave_count, width, height))
                .collect(),
            width,
            height,
            pointer: center,
            target_pointer: center,
        }
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    /// Raw pointer position; the tracked position eases toward it each frame.
    pub fn set_pointer_target(&mut self, x: f32, y: f32) {
        self.target_pointer = (x, y);
    }

    /// Rebuild point grids for a new viewport. The caller keeps supplying the
    /// same monotonic time to `update`, so motion continues seamlessly.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        for wave in &mut self.waves {
            wave.rebuild_points(width, height);
        }
    }

    /// How strongly the pointer perturbs the waves: 1 at dead center of the
    /// viewport, falling to 0 at the far corner.
    pub fn mouse_influence(&self) -> f32 {
        let (cx, cy) = (self.width / 2.0, self.height / 2.0);
        let dx = self.pointer.0 - cx;
        let dy = self.pointer.1 - cy;
        let distance = (dx * dx + dy * dy).sqrt();
        let max_distance = (cx * cx + cy * cy).sqrt();
        if max_distance <= 0.0 {
            return 1.0;
        }
        1.0 - (distance / max_distance).min(1.0)
    }

    /// Advance the animation to `time` (seconds, monotonic since startup).
    pub fn update(&mut self, time: f32) {
        self.pointer.0 += (self.target_pointer.0 - self.pointer.0) * POINTER_SMOOTHING;
        self.pointer.1 += (self.target_pointer.1 - self.pointer.1) * POINTER_SMOOTHING;

        let influence = self.mouse_influence();
        let (px, py) = self.pointer;
        // Pointer above center pushes the lines up, below pushes down.
        let direction = if py < self.height / 2.0 { -1.0 } else { 1.0 };

        for wave in &mut self.waves {
            wave.phase = time * wave.speed + wave.offset;
            for point in &mut wave.points {
                let dx = point.x - px;
                let dy = point.base_y - py;
                let distance = (dx * dx + dy * dy).sqrt();
                let proximity = (1.0 - distance / POINTER_FALLOFF).max(0.0);
                let pointer_effect = proximity * influence * POINTER_MAGNITUDE * direction;

                let base_wave = (point.x * wave.frequency + wave.phase).sin() * wave.amplitude;
                let target_y = point.base_y + base_wave + pointer_effect;

                point.current_y += (target_y - point.current_y) * POINT_SMOOTHING;
            }
        }
    }
}
