use super::*;

#[test]
fn three_words_wrap_to_two_lines() {
    let block = TextLayout::default().layout("AAAA BBBB CCCC");
    assert_eq!(block.lines, vec!["AAAA BBBB", "CCCC"]);
    assert_eq!(block.width, 42);
    assert_eq!(block.height, 24);
}

#[test]
fn empty_text_has_no_lines() {
    let block = TextLayout::default().layout("");
    assert!(block.lines.is_empty());
    assert_eq!((block.width, block.height), (0, 0));
}

#[test]
fn overlong_word_never_yields_empty_line() {
    let block = TextLayout::default().layout("supercalifragilistic ok");
    assert!(block.lines.iter().all(|l| !l.is_empty()));
    assert_eq!(block.lines.first().map(String::as_str), Some("supercalifragilistic"));
}

#[test]
fn height_grows_with_wrapped_lines() {
    let layout = TextLayout::default();
    let block = layout.layout("a bb ccc dddd eeeee ffffff ggggggg");
    assert!(block.height >= layout.char_height * block.lines.len() as u32);
    assert_eq!(block.lines.join(" "), "a bb ccc dddd eeeee ffffff ggggggg");
}

#[test]
fn custom_metrics_scale_width() {
    let layout = TextLayout {
        char_width: 12,
        char_height: 24,
        target_ratio: 3.0,
    };
    let block = layout.layout("AAAA BBBB CCCC");
    assert_eq!(block.width, 84);
    assert_eq!(block.height, 48);
}
