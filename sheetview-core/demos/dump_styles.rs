use sheetview_core::reader::parse;
use sheetview_core::style::StyleResolver;
use std::env;
use std::fs;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: dump_styles <file>");
        return;
    }
    let path = &args[1];
    let bytes = fs::read(path).unwrap();
    let workbook = parse(&bytes).unwrap();
    let resolver = StyleResolver::default();

    for sheet in &workbook.sheets {
        println!("Sheet: {} ({})", sheet.name, sheet.range);
        for cell in sheet.cells.iter().filter(|c| c.style_ref.is_some()) {
            let style = resolver.resolve(workbook.style_of(cell), &cell.value);
            println!(
                "  {} [xf {}]: bg={} color={} {} {} size={} align={}/{} border={}",
                cell.reference(),
                cell.style_ref.unwrap_or_default(),
                style.background_color.as_deref().unwrap_or("-"),
                style.text_color.as_deref().unwrap_or("-"),
                style.font_weight.as_css(),
                style.font_style.as_css(),
                style.font_size.as_deref().unwrap_or("-"),
                style.text_align.as_css(),
                style.vertical_align.as_css(),
                style.border.as_deref().unwrap_or("-"),
            );
        }
    }
}
