//! `--report-sizes` mode: probe every input file with ffprobe and print a
//! width/height histogram instead of transcoding anything. Grounded on
//! `foreman.go`'s `ReportSizes`.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::print_success;
use crate::config::Settings;
use crate::core::histogram::Histogram;
use crate::core::metadata;
use crate::core::scanner;
use crate::error::ReelcatError;

/// One row of a size histogram table.
#[derive(Tabled)]
struct HistogramRow {
    #[tabled(rename = "Pixels")]
    value: String,
    #[tabled(rename = "Count")]
    count: u64,
}

fn render(title: &str, histogram: &Histogram) -> String {
    let mut rows: Vec<(String, u64)> = histogram.rows();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let rows: Vec<HistogramRow> = rows
        .into_iter()
        .map(|(value, count)| HistogramRow { value, count })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{title}\n{table}")
}

/// Scan `settings.paths` and report a histogram of video widths/heights.
pub async fn execute(settings: &Settings) -> Result<(), ReelcatError> {
    let scanned = scanner::scan(&settings.paths)?;

    let mut widths = Histogram::new();
    let mut heights = Histogram::new();

    for (path, files) in &scanned {
        if settings.verbose {
            log::info!("Path: {} has {} files", path.display(), files.len());
        }

        for file in files {
            match metadata::get_video_info(&file.path).await {
                Ok(info) => {
                    log::info!("{} {}x{}", file.path.display(), info.width, info.height);
                    widths.add(info.width.to_string());
                    heights.add(info.height.to_string());
                }
                Err(e) => log::warn!("{} {}", file.path.display(), e.user_friendly_message()),
            }
        }
    }

    println!("{}", render("Widths", &widths));
    println!("{}", render("Heights", &heights));
    print_success("Sizes report complete");
    Ok(())
}
