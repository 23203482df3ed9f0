//! Integer error-accumulator stepping shared by the line and circle walkers.

use super::Point;

/// 整數誤差累加器
///
/// 每一步加上 `gain`，當誤差超過 `limit` 時扣除 `correction`，
/// 並告知呼叫端推進副軸。直線與圓形只差在這三個值如何計算。
#[derive(Debug, Clone, Copy)]
pub(crate) struct ErrorAccumulator {
    error: i64,
}

impl ErrorAccumulator {
    pub fn new(seed: i64) -> Self {
        Self { error: seed }
    }

    #[inline]
    pub fn accumulate(&mut self, gain: i64, limit: i64, correction: i64) -> bool {
        self.error += gain;
        if self.error > limit {
            self.error -= correction;
            true
        } else {
            false
        }
    }

    /// 一次前進 `steps` 步，回傳其間觸發修正的次數
    ///
    /// 只適用於 `limit == correction - 1` 且 `gain <= correction` 的直線累加，
    /// 結果與逐步呼叫 `accumulate` 相同。
    pub fn advance(&mut self, steps: i64, gain: i64, correction: i64) -> i64 {
        let correction = correction as i128;
        let total = self.error as i128 + steps as i128 * gain as i128;
        self.error = total.rem_euclid(correction) as i64;
        total.div_euclid(correction) as i64
    }
}

/// 無號整數平方根（向下取整）
fn isqrt(n: i128) -> i128 {
    let mut root = (n as f64).sqrt() as i128;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

/// 八分圓走訪在第 `dy` 列的 dx：滿足 dx² - dx <= r² - dy² 的最大值
fn boundary_dx(radius: i64, dy: i64) -> Option<i64> {
    let room = radius as i128 * radius as i128 - dy as i128 * dy as i128;
    if room < 0 {
        return None;
    }
    let mut dx = isqrt(room);
    while (dx + 1) * dx <= room {
        dx += 1;
    }
    while dx * (dx - 1) > room {
        dx -= 1;
    }
    Some(dx as i64)
}

/// 與 `OctantSteps` 一致的實心圓半弦寬，`offset` 為與圓心相距的列數
///
/// 在八分圓範圍內取該列的邊界點 dx；超出時取 dx 等於該列距離的
/// 最後一個邊界點的 dy。
pub(crate) fn chord_half_width(radius: u32, offset: i64) -> Option<i64> {
    let r = radius as i64;
    let offset = offset.abs();
    if offset > r {
        return None;
    }
    if offset == 0 {
        return Some(r);
    }
    let dx = boundary_dx(r, offset)?;
    if dx >= offset {
        return Some(dx);
    }
    let room = r as i128 * r as i128 - offset as i128 * offset as i128 + offset as i128;
    Some(isqrt(room) as i64)
}

/// 8 連通的直線像素序列
///
/// 端點會先正規化成沿主軸遞增的方向，因此 (a→b) 與 (b→a)
/// 產生完全相同的像素集合。
#[derive(Debug, Clone)]
pub(crate) struct LineSteps {
    major: i64,
    minor: i64,
    major_is_x: bool,
    minor_step: i64,
    d_major: i64,
    d_minor: i64,
    remaining: i64,
    started: bool,
    acc: ErrorAccumulator,
}

impl LineSteps {
    pub fn new(from: Point, to: Point) -> Self {
        let (x0, y0) = (from.x as i64, from.y as i64);
        let (x1, y1) = (to.x as i64, to.y as i64);
        let major_is_x = (x1 - x0).abs() >= (y1 - y0).abs();

        // 永遠沿主軸正方向前進
        let ((x0, y0), (x1, y1)) = match major_is_x {
            true if x0 > x1 => ((x1, y1), (x0, y0)),
            false if y0 > y1 => ((x1, y1), (x0, y0)),
            _ => ((x0, y0), (x1, y1)),
        };

        let (major, minor, d_major, d_minor) = if major_is_x {
            (x0, y0, x1 - x0, y1 - y0)
        } else {
            (y0, x0, y1 - y0, x1 - x0)
        };

        Self {
            major,
            minor,
            major_is_x,
            minor_step: d_minor.signum(),
            d_major,
            d_minor: d_minor.abs(),
            remaining: d_major,
            started: false,
            acc: ErrorAccumulator::new(d_major / 2),
        }
    }

    /// 直接跳到主軸座標 `target`，必須在第一次 `next` 之前呼叫
    ///
    /// 跳過的部分與逐步前進產生的像素完全一致，只是不再一一走訪。
    pub fn skip_to(&mut self, target: i64) {
        debug_assert!(!self.started);
        let steps = (target - self.major).clamp(0, self.remaining);
        if steps == 0 {
            return;
        }
        let carries = self.acc.advance(steps, self.d_minor, self.d_major);
        self.minor += self.minor_step * carries;
        self.major += steps;
        self.remaining -= steps;
    }

    /// 主軸座標已越過 `end` 時不會再產生任何 `end` 以內的點
    pub fn past_major(&self, end: i64) -> bool {
        self.major > end
    }

    pub fn major_is_x(&self) -> bool {
        self.major_is_x
    }

    fn point(&self) -> Point {
        let (x, y) = if self.major_is_x {
            (self.major, self.minor)
        } else {
            (self.minor, self.major)
        };
        Point::new(x as i32, y as i32)
    }
}

impl Iterator for LineSteps {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if !self.started {
            self.started = true;
            return Some(self.point());
        }
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self
            .acc
            .accumulate(self.d_minor, self.d_major - 1, self.d_major)
        {
            self.minor += self.minor_step;
        }
        self.major += 1;
        Some(self.point())
    }
}

/// 圓形第一個八分圓的邊界點 (dx, dy)，dx >= dy
///
/// 誤差項維持 dx² + dy² - r²，當 dx² - dx + dy² > r² 時 dx 減一。
#[derive(Debug, Clone)]
pub(crate) struct OctantSteps {
    dx: i64,
    dy: i64,
    acc: ErrorAccumulator,
}

impl OctantSteps {
    pub fn new(radius: u32) -> Self {
        Self {
            dx: radius as i64,
            dy: 0,
            acc: ErrorAccumulator::new(0),
        }
    }

    /// 從第 `dy` 列開始走訪，`dy` 超過半徑時不產生任何點
    pub fn starting_at(radius: u32, dy: i64) -> Self {
        if dy <= 0 {
            return Self::new(radius);
        }
        let r = radius as i64;
        match boundary_dx(r, dy) {
            Some(dx) => Self {
                dx,
                dy,
                acc: ErrorAccumulator::new(dx * dx + dy * dy - r * r),
            },
            None => Self {
                dx: -1,
                dy,
                acc: ErrorAccumulator::new(0),
            },
        }
    }
}

impl Iterator for OctantSteps {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<(i64, i64)> {
        if self.dx < self.dy {
            return None;
        }
        let current = (self.dx, self.dy);
        self.dy += 1;
        if self
            .acc
            .accumulate(2 * self.dy - 1, self.dx, 2 * self.dx - 1)
        {
            self.dx -= 1;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
        LineSteps::new(Point::new(x0, y0), Point::new(x1, y1))
            .map(|p| (p.x, p.y))
            .collect()
    }

    #[test]
    fn test_single_point() {
        assert_eq!(collect(3, 4, 3, 4), vec![(3, 4)]);
    }

    #[test]
    fn test_shallow_line() {
        // 斜率 1/2，半步時進位
        assert_eq!(
            collect(0, 0, 4, 2),
            vec![(0, 0), (1, 1), (2, 1), (3, 2), (4, 2)]
        );
    }

    #[test]
    fn test_steep_line_reversed() {
        assert_eq!(
            collect(1, 3, 0, 0),
            vec![(0, 0), (0, 1), (1, 2), (1, 3)]
        );
    }

    #[test]
    fn test_octant_radius_five() {
        let steps: Vec<_> = OctantSteps::new(5).collect();
        assert_eq!(steps, vec![(5, 0), (5, 1), (5, 2), (4, 3)]);
    }

    #[test]
    fn test_octant_radius_zero() {
        let steps: Vec<_> = OctantSteps::new(0).collect();
        assert_eq!(steps, vec![(0, 0)]);
    }

    #[test]
    fn test_skip_matches_stepping() {
        let ends = [(-40, 7), (-40, -13), (-9, 30), (25, -30), (-3, -3), (0, 0)];
        for &(x0, y0) in &ends {
            for &(x1, y1) in &ends {
                let walked: Vec<_> = LineSteps::new(Point::new(x0, y0), Point::new(x1, y1))
                    .collect();
                for target in -45..35 {
                    let mut steps = LineSteps::new(Point::new(x0, y0), Point::new(x1, y1));
                    steps.skip_to(target);
                    let rest: Vec<_> = steps.collect();
                    assert!(walked.ends_with(&rest), "({}, {})->({}, {}) @ {}", x0, y0, x1, y1, target);
                    assert!(!rest.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_skip_far_line_is_cheap() {
        let mut steps = LineSteps::new(Point::new(i32::MIN, -7), Point::new(i32::MAX, 9));
        steps.skip_to(0);
        let first = steps.next().unwrap();
        assert_eq!(first.x, 0);
        assert_eq!(first.y, 1);
    }

    #[test]
    fn test_octant_resume_matches_walk() {
        for r in 0..300u32 {
            let walked: Vec<_> = OctantSteps::new(r).collect();
            for (i, _) in walked.iter().enumerate() {
                let resumed: Vec<_> = OctantSteps::starting_at(r, i as i64).collect();
                assert_eq!(resumed, walked[i..], "r={} dy={}", r, i);
            }
            assert_eq!(OctantSteps::starting_at(r, walked.len() as i64 + 1).next(), None);
            assert_eq!(OctantSteps::starting_at(r, r as i64 + 5).next(), None);
        }
    }

    #[test]
    fn test_chord_half_width_matches_walk() {
        for r in 0..300u32 {
            let mut widest = vec![None; r as usize + 2];
            for (dx, dy) in OctantSteps::new(r) {
                for (row, half) in [(dy, dx), (dx, dy)] {
                    let slot: &mut Option<i64> = &mut widest[row as usize];
                    *slot = Some(slot.map_or(half, |w| w.max(half)));
                }
            }
            for (row, expected) in widest.iter().enumerate() {
                assert_eq!(chord_half_width(r, row as i64), *expected, "r={} row={}", r, row);
                assert_eq!(chord_half_width(r, -(row as i64)), *expected);
            }
        }
    }

    #[test]
    fn test_octant_stays_near_circle() {
        for r in 1..200u32 {
            let r2 = (r as i64) * (r as i64);
            for (dx, dy) in OctantSteps::new(r) {
                assert!(dx * dx - dx + dy * dy <= r2, "r={} ({}, {})", r, dx, dy);
                assert!(dx * dx + dx + dy * dy > r2, "r={} ({}, {})", r, dx, dy);
            }
        }
    }
}
