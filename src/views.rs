use crate::{
    database::CurationRecord,
    frame::{Card, Frame, Intent},
    profile::Profile,
};

pub const COMMENTARY_QUESTION: &str =
    "Would you like to add some commentary on this artwork before curating?";
pub const COMMENTARY_PLACEHOLDER: &str = "write your thoughts here";

pub fn prompt_frame(caster: &Profile, post_url: &str) -> Frame {
    Frame::new(Card::new(format!("Curate {}", caster.username)).with_text(COMMENTARY_QUESTION))
        .with_intent(Intent::text_input(COMMENTARY_PLACEHOLDER))
        .with_intent(Intent::button("Submit"))
        .with_post_url(post_url)
}

pub fn confirmation_frame(record: &CurationRecord) -> Frame {
    Frame::new(
        Card::new(format!("Thanks for your curation, {}!", record.curator_username)).with_text(
            format!("Your commentary on {}'s cast was saved.", record.caster_username),
        ),
    )
}

pub fn install_frame(action_url: &str) -> Frame {
    Frame::new(Card::new("Install the Curate action!"))
        .with_intent(Intent::add_cast_action("Add Curate Cast Action", action_url))
}

pub fn test_frame(action_url: &str) -> Frame {
    Frame::new(Card::new("Curate").with_text(COMMENTARY_QUESTION))
        .with_intent(Intent::add_cast_action("banana", action_url))
}
