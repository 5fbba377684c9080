use emojify::{ConfigUpdate, Emojify};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn img(name: &str) -> String {
    format!(
        "<img align='absmiddle' alt=':{name}:' class='emoji' src='images/emoji/{name}.png' title=':{name}:' />"
    )
}

#[rstest]
#[case::bare(":)", "{}")]
#[case::space_before(" :)", " {}")]
#[case::space_after(":) ", "{} ")]
#[case::space_around(" :) ", " {} ")]
#[case::start_of_string(":) start of string with space", "{} start of string with space")]
#[case::end_of_string("end of string with space :)", "end of string with space {}")]
fn smile_with_spacing(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(Emojify::default().replace(input), expected.replace("{}", &img("smile")));
}

#[rstest]
#[case::url(
    "a link for you https://hacks.mozilla.org/2014/06/introducing-the-web-audio-editor-in-firefox-developer-tools/"
)]
#[case::contraction("I thought it'd run forever")]
#[case::escaped_contraction("I&#x27;d better not see emoji in this string; that'd suck")]
#[case::glued_mid_sentence("hey:) there")]
#[case::plain("nothing to see here")]
#[case::unknown_name("what is :definitely_not_an_emoji: anyway")]
#[case::long_s("a :\u{17f} b")]
#[case::kelvin_sign("a :\u{212a}iss: b")]
fn leaves_text_alone(#[case] input: &str) {
    assert_eq!(Emojify::default().replace(input), input);
}

#[test]
fn glued_at_the_end_is_accepted() {
    assert_eq!(Emojify::default().replace("hey:)"), format!("hey{}", img("smile")));
}

#[test]
fn adjacent_named_emoji() {
    assert_eq!(
        Emojify::default().replace(":railway_car::railway_car:"),
        format!("{0}{0}", img("railway_car"))
    );
}

#[test]
fn adjacent_emoticons() {
    assert_eq!(
        Emojify::default().replace(":):P"),
        format!("{}{}", img("smile"), img("stuck_out_tongue_winking_eye"))
    );
    assert_eq!(Emojify::default().replace(":):):)"), img("smile").repeat(3));
}

#[test]
fn named_emoji() {
    assert_eq!(Emojify::default().replace(":necktie:"), img("necktie"));
}

#[rstest]
#[case::heart("inserts a <3 heart", "inserts a {} heart", "heart")]
#[case::escaped_heart("inserts a &lt;3 heart", "inserts a {} heart", "heart")]
#[case::broken_heart("so </3 sad", "so {} sad", "broken_heart")]
#[case::escaped_sob("aww :&#x27;( aw", "aww {} aw", "sob")]
#[case::thumbsdown("meh :-1: really", "meh {} really", "thumbsdown")]
fn single_emoticons(#[case] input: &str, #[case] expected: &str, #[case] name: &str) {
    assert_eq!(Emojify::default().replace(input), expected.replace("{}", &img(name)));
}

#[test]
fn sob_with_both_apostrophes() {
    assert_eq!(
        Emojify::default().replace("aww :'( aw :’("),
        format!("aww {} aw {}", img("sob"), img("sob"))
    );
}

#[test]
fn open_mouth_is_case_insensitive() {
    assert_eq!(
        Emojify::default().replace(":o :O"),
        format!("{0} {0}", img("open_mouth"))
    );
}

#[test]
fn ignore_emoticons_keeps_named_and_thumbs() {
    let mut emojify = Emojify::default();
    emojify.set_config(ConfigUpdate::default().ignore_emoticons(true));
    assert_eq!(
        emojify.replace(":) :+1: :P :musical_note:"),
        format!(":) {} :P {}", img("thumbsup"), img("musical_note"))
    );

    emojify.set_config(ConfigUpdate::default().ignore_emoticons(false));
    assert_eq!(emojify.replace(":)"), img("smile"));
}

#[test]
fn output_names_are_canonical() {
    let emojify = Emojify::default();
    let tag = |_: &str, name: &str| format!("[{name}]");
    let out = emojify.replace_with("<3 :D ;p X-D :-* :-| :-$ :-x :-/ :-s :-[ :-] :( ;)", &tag);
    assert_eq!(
        out,
        "[heart] [grinning] [stuck_out_tongue_winking_eye] [stuck_out_tongue_closed_eyes] \
         [kissing_heart] [flushed] [relaxed] [mask] [pensive] [confounded] [rage] [smirk] \
         [frowning] [wink]"
    );
}
