// VGA 320x200 示範程式
// 畫出基本圖形後進入滑鼠繪圖模式，按 Esc 或 q 結束
// 用法: retro_vga_demo [snapshot.bmp] [font.bmp]

use log::{error, info, LevelFilter};
use retro_vga::{
    utils, Bitmap, Config, ConfigBuilder, CursorKind, Key, MouseRecord, Point, Result, Rgb, Vga,
};
use std::path::Path;
use std::time::Duration;

const COLORS: [Rgb; 8] = [
    Rgb::new(0, 0, 0),
    Rgb::new(255, 255, 255),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 255, 0),
    Rgb::new(255, 0, 255),
    Rgb::new(0, 255, 255),
];

fn main() {
    if let Err(e) = utils::logger::init(LevelFilter::Info, Some(Path::new("logs"))) {
        eprintln!("❌ 無法初始化日誌: {}", e);
    }

    // 處理命令行參數：可選的 BMP 輸出路徑與字型圖
    let args: Vec<String> = std::env::args().collect();
    let snapshot = args.get(1).map(String::as_str);
    let font = args.get(2).map(String::as_str);

    let config = match Config::from_env() {
        Ok(config) => ConfigBuilder::new()
            .video_config(config.video)
            .cursor(match config.input.cursor {
                CursorKind::None => CursorKind::Cross,
                other => other,
            })
            .build(),
        Err(e) => {
            error!("環境變數設定錯誤: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config, snapshot, font) {
        error!("示範程式失敗: {}", e);
        std::process::exit(1);
    }
}

fn run(config: Config, snapshot: Option<&str>, font: Option<&str>) -> Result<()> {
    let mut vga = Vga::window(config);
    vga.init()?;

    for i in 0..255 {
        let c = COLORS[i % COLORS.len()];
        vga.set_color(i, c.red, c.green, c.blue)?;
    }

    // 每個顏色一小格
    for i in 0..8 {
        for y in 0..8 {
            for x in 0..8 {
                vga.set_pixel(i * 10 + x, y, i as usize)?;
            }
        }
    }

    vga.line(50, 50, 60, 70, 1)?;
    vga.rect(10, 100, 60, 150, 2)?;
    vga.filled_rect(70, 100, 120, 150, 3)?;
    vga.circle(200, 100, 20, 4)?;
    vga.filled_circle(250, 150, 30, 5)?;
    vga.polygon(
        &[
            Point::new(150, 20),
            Point::new(190, 60),
            Point::new(170, 80),
            Point::new(130, 60),
        ],
        6,
    )?;

    if let Some(path) = font {
        let font = Bitmap::load(path, false)?;
        let text = "This is a test\nof the emergency\nbroadcast system!";
        vga.render_string(&font, 10, 160, text, 7)?;
    }
    vga.present()?;
    info!("圖形繪製完成，進入滑鼠繪圖模式");

    if let Some(path) = snapshot {
        vga.capture(0, 0, Vga::WIDTH, Vga::HEIGHT)?.save(path)?;
        info!("畫面已儲存: {}", path);
    }

    vga.mouse_init()?;
    while vga.window_open() {
        if let Some(key) = vga.keyboard_poll()? {
            if key == Key::Escape || key.as_char() == Some('q') {
                info!("按鍵 {:?}，結束", key);
                break;
            }
        }
        if vga.mouse_update(false)? {
            let mouse = vga.mouse_buttons()?;
            if mouse.any_down() {
                vga.set_pixel(mouse.x, mouse.y, brush(&mouse))?;
            }
        }
        vga.idle(Duration::from_millis(10))?;
    }

    vga.exit()
}

/// 左鍵白色，右鍵紅色，中鍵綠色
fn brush(mouse: &MouseRecord) -> usize {
    if mouse.left {
        1
    } else if mouse.right {
        2
    } else {
        3
    }
}
