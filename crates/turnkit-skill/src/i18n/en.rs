pub const PHRASES: &[(&str, &[&str])] = &[
    ("welcome", &["Welcome!"]),
    (
        "error-prompt",
        &["Which kind of error do you want to trigger: Time-out, invalid response, or runtime exception?"],
    ),
    (
        "error-help",
        &[concat!(
            "A time-out error is when the function takes too long to respond. <break time=\"300ms\"/>",
            "An invalid response is when the voice service receives a response with unexpected properties. <break time=\"300ms\"/>",
            "A runtime exception is when a bug in the skill code prevents it from completing the execution. <break time=\"300ms\"/>",
        )],
    ),
    ("error-reject", &["This is not a supported error type."]),
    (
        "error-confirm",
        &[
            "Certainly!  <break time=\"500ms\"/>",
            "As you wish!  <break time=\"500ms\"/>",
            "Alright!  <break time=\"500ms\"/>",
        ],
    ),
    ("error-sound", &[super::ERROR_SOUND]),
    ("goodbye-default", &["Bye!"]),
    ("goodbye-error", &["Sorry, something went wrong. Please try again later."]),
];
