//! Frame assertions on the staged append-buffer bytes.

use core_config::Config;
use core_input::{Input, Key};
use core_render::{FrameBuffer, render_frame};
use core_state::Editor;

fn frame_bytes(editor: &Editor) -> Vec<u8> {
    let mut frame = FrameBuffer::new();
    render_frame(editor, &mut frame).expect("staging a frame cannot fail");
    frame.as_bytes().to_vec()
}

fn frame_string(editor: &Editor) -> String {
    String::from_utf8(frame_bytes(editor)).expect("frames built here are valid UTF-8")
}

fn editor(cols: u16, rows: u16) -> Editor {
    let mut ed = Editor::new(Config::default());
    ed.set_screen_size(cols, rows);
    ed
}

fn press(ed: &mut Editor, key: Key) {
    ed.scroll();
    ed.process_input(Input::Key(key));
}

#[test]
fn envelope_hides_homes_and_shows_the_cursor() {
    let mut ed = editor(40, 10);
    ed.scroll();
    let out = frame_string(&ed);
    assert!(out.starts_with("\x1b[?25l\x1b[H"));
    assert!(out.ends_with("\x1b[1;1H\x1b[?25h"));
}

#[test]
fn empty_buffer_shows_tildes_and_the_welcome_banner() {
    let mut ed = editor(40, 10);
    ed.scroll();
    let out = frame_string(&ed);
    assert!(out.contains("Kilo editor -- version"));
    // 8 text rows; one hosts the banner, the others a tilde.
    assert_eq!(out.matches("~").count(), 8);
    assert_eq!(out.matches("\r\n").count(), 9, "eight rows plus the status bar");
}

#[test]
fn every_text_line_is_erased_to_the_right() {
    let mut ed = editor(40, 10);
    ed.scroll();
    let out = frame_string(&ed);
    // 8 text rows + the message bar all clear the line remainder.
    assert_eq!(out.matches("\x1b[K").count(), 9);
}

#[test]
fn status_bar_reports_name_lines_and_filetype() {
    let mut ed = editor(60, 10);
    press(&mut ed, Key::Char(b'x'));
    ed.scroll();
    let out = frame_string(&ed);
    assert!(out.contains("\x1b[7m"), "status bar renders in reverse video");
    assert!(out.contains("[No Name] - 1 lines (modified)"));
    assert!(out.contains("no ft | 1/1"));
}

#[test]
fn message_bar_shows_the_help_line_until_it_expires() {
    let mut ed = editor(80, 10);
    ed.set_status(core_state::HELP_MESSAGE);
    ed.scroll();
    let out = frame_string(&ed);
    assert!(out.contains("HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find"));
}

#[test]
fn typed_text_appears_in_the_frame() {
    let mut ed = editor(40, 10);
    for b in b"hello" {
        press(&mut ed, Key::Char(*b));
    }
    ed.scroll();
    let out = frame_string(&ed);
    assert!(out.contains("hello"));
    // Cursor sits after the text: row 1, column 6.
    assert!(out.ends_with("\x1b[1;6H\x1b[?25h"));
}

#[test]
fn keywords_render_with_their_colour_and_reset_after() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.c");
    std::fs::write(&path, b"int x = 42;\n").unwrap();

    let mut ed = Editor::open(&path, Config::default()).expect("open should succeed");
    ed.set_screen_size(60, 10);
    ed.scroll();
    let out = frame_string(&ed);
    assert!(out.contains("\x1b[34mint"), "type keyword in colour 34");
    assert!(out.contains("\x1b[31m42"), "number literal in colour 31");
    assert!(
        out.contains("\x1b[39mx") || out.contains("\x1b[39m x"),
        "normal text returns to the default foreground"
    );
}

#[test]
fn colour_switches_only_on_class_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.c");
    std::fs::write(&path, b"1234\n").unwrap();

    let mut ed = Editor::open(&path, Config::default()).expect("open should succeed");
    ed.set_screen_size(60, 10);
    ed.scroll();
    let out = frame_string(&ed);
    assert!(out.contains("\x1b[31m1234"), "one colour switch for the whole run");
    assert_eq!(out.matches("\x1b[31m").count(), 1);
}

#[test]
fn control_bytes_render_reverse_video_caret_notation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ctrl.txt");
    std::fs::write(&path, b"a\x01b\x7fc\n").unwrap();

    let mut ed = Editor::open(&path, Config::default()).expect("open should succeed");
    ed.set_screen_size(60, 10);
    ed.scroll();
    let out = frame_string(&ed);
    assert!(out.contains("\x1b[7mA\x1b[m"), "0x01 renders as reverse-video A");
    assert!(out.contains("\x1b[7m?\x1b[m"), "DEL renders as reverse-video ?");
}

#[test]
fn horizontal_scroll_clips_the_visible_slice() {
    let mut ed = editor(10, 10);
    for b in b"0123456789abcdef" {
        press(&mut ed, Key::Char(*b));
    }
    ed.scroll();
    let out = frame_string(&ed);
    assert!(out.contains("789abcdef"), "window shows the tail of the row");
    assert!(!out.contains("012"), "scrolled-out prefix is not emitted");
}

#[test]
fn welcome_banner_disappears_once_content_exists() {
    let mut ed = editor(40, 10);
    press(&mut ed, Key::Char(b'x'));
    ed.scroll();
    let out = frame_string(&ed);
    assert!(!out.contains("Kilo editor"));
}
