/*
================================================================================
VGA - 光柵化模組
================================================================================
把直線、矩形、圓形與多邊形轉成畫面上的離散像素

規則：
- 色彩索引在動手前驗證一次，失敗時畫面完全不變
- 幾何座標永遠不會造成錯誤，畫面外的點直接裁切
- 直線與圓形共用 stepper 中的整數誤差累加器
================================================================================
*/

pub(crate) mod stepper;

use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::palette::check_index;
use stepper::{chord_half_width, LineSteps, OctantSteps};

/// 畫面座標，允許落在畫面外
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

fn check_radius(radius: i32) -> Result<u32> {
    u32::try_from(radius)
        .map_err(|_| Error::invalid_argument(format!("半徑不可為負數: {}", radius)))
}

fn normalize(a: Point, b: Point) -> (Point, Point) {
    (
        Point::new(a.x.min(b.x), a.y.min(b.y)),
        Point::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

/// 圓心到畫面某一軸上所有座標的距離範圍 [最小, 最大]
fn offset_range(center: i64, len: usize) -> (i64, i64) {
    let last = len as i64 - 1;
    if center < 0 {
        (-center, last - center)
    } else if center > last {
        (center - last, center)
    } else {
        (0, center.max(last - center))
    }
}

/// 以 (cx, cy) 為中心、半徑 r 的外接方框是否與畫面相交
fn touches_screen(fb: &Framebuffer, cx: i64, cy: i64, r: i64) -> bool {
    cx + r >= 0 && cx - r < fb.width() as i64 && cy + r >= 0 && cy - r < fb.height() as i64
}

fn draw_line(fb: &mut Framebuffer, from: Point, to: Point, color: u8) {
    let mut steps = LineSteps::new(from, to);
    let end = if steps.major_is_x() {
        fb.width() as i64 - 1
    } else {
        fb.height() as i64 - 1
    };
    // 畫面前的部分直接跳過
    steps.skip_to(0);
    while !steps.past_major(end) {
        match steps.next() {
            Some(p) => fb.plot(p.x, p.y, color),
            None => break,
        }
    }
}

/// Bresenham 直線，包含兩端點
pub fn line(fb: &mut Framebuffer, from: Point, to: Point, color: usize) -> Result<()> {
    let color = check_index(color)?;
    draw_line(fb, from, to, color);
    Ok(())
}

/// 矩形外框：上、下、左、右四條線
pub fn rect(fb: &mut Framebuffer, a: Point, b: Point, color: usize) -> Result<()> {
    let color = check_index(color)?;
    let (tl, br) = normalize(a, b);
    draw_line(fb, tl, Point::new(br.x, tl.y), color);
    draw_line(fb, Point::new(tl.x, br.y), br, color);
    draw_line(fb, tl, Point::new(tl.x, br.y), color);
    draw_line(fb, Point::new(br.x, tl.y), br, color);
    Ok(())
}

/// 實心矩形，邊界包含在內
pub fn filled_rect(fb: &mut Framebuffer, a: Point, b: Point, color: usize) -> Result<()> {
    let color = check_index(color)?;
    let (tl, br) = normalize(a, b);
    let top = tl.y.max(0);
    let bottom = br.y.min(fb.height() as i32 - 1);
    for y in top..=bottom {
        fb.span(tl.x, br.x, y, color);
    }
    Ok(())
}

/// 圓形外框，一個八分圓映射到其餘七個
pub fn circle(fb: &mut Framebuffer, center: Point, radius: i32, color: usize) -> Result<()> {
    let color = check_index(color)?;
    let radius = check_radius(radius)?;
    let (cx, cy) = (center.x as i64, center.y as i64);
    if !touches_screen(fb, cx, cy, radius as i64) {
        return Ok(());
    }
    // 每個鏡射點都以 dy 為其中一軸的位移，只需走訪 dy 落在畫面範圍內的列
    let ranges = [
        offset_range(cx, fb.width()),
        offset_range(cy, fb.height()),
    ];

    let mut plot = |x: i64, y: i64| {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            fb.plot(x, y, color);
        }
    };

    let visible = ranges.into_iter().flat_map(|(first, last)| {
        OctantSteps::starting_at(radius, first).take_while(move |&(_, dy)| dy <= last)
    });
    for (dx, dy) in visible {
        plot(cx + dx, cy - dy);
        plot(cx + dy, cy - dx);
        plot(cx - dy, cy - dx);
        plot(cx - dx, cy - dy);
        plot(cx - dx, cy + dy);
        plot(cx - dy, cy + dx);
        plot(cx + dy, cy + dx);
        plot(cx + dx, cy + dy);
    }
    Ok(())
}

/// 實心圓
///
/// 每條掃描線的半弦寬與 `circle` 的八分圓邊界點一致（取該列最寬者），
/// 因此外框的每個點都落在填色範圍內。
pub fn filled_circle(
    fb: &mut Framebuffer,
    center: Point,
    radius: i32,
    color: usize,
) -> Result<()> {
    let color = check_index(color)?;
    let radius = check_radius(radius)?;
    let (cx, cy) = (center.x as i64, center.y as i64);
    let r = radius as i64;
    if !touches_screen(fb, cx, cy, r) {
        return Ok(());
    }

    let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    let top = (cy - r).max(0);
    let bottom = (cy + r).min(fb.height() as i64 - 1);
    for y in top..=bottom {
        if let Some(half) = chord_half_width(radius, y - cy) {
            fb.span(clamp(cx - half), clamp(cx + half), y as i32, color);
        }
    }
    Ok(())
}

/// 封閉多邊形外框，最後一個頂點連回第一個
pub fn polygon(fb: &mut Framebuffer, vertices: &[Point], color: usize) -> Result<()> {
    let color = check_index(color)?;
    if vertices.len() < 2 {
        return Err(Error::invalid_argument(format!(
            "多邊形至少需要 2 個頂點，收到 {}",
            vertices.len()
        )));
    }
    for pair in vertices.windows(2) {
        draw_line(fb, pair[0], pair[1], color);
    }
    draw_line(fb, vertices[vertices.len() - 1], vertices[0], color);
    Ok(())
}
