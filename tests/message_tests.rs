use funnel_core::core::deep_link::{encode_uri_component, whatsapp_url};
use funnel_core::core::message::{format_message, MessageFields};
use funnel_core::domain::{FunnelData, Service};
use insta::assert_snapshot;

fn wrapping_lead() -> FunnelData {
    FunnelData {
        service: Some(Service::Wrapping),
        year: Some("2023".into()),
        make: Some("BMW".into()),
        model: Some("M4".into()),
        package: Some("full_wrap".into()),
        finish: Some("satin".into()),
        condition: Some("good".into()),
        timing: Some("this_week".into()),
        name: Some("Omar".into()),
        color_idea: Some("  Nardo grey  ".into()),
        ..FunnelData::default()
    }
}

#[test]
fn wrapping_message_includes_color_idea() {
    let data = wrapping_lead();
    let message = format_message(&MessageFields::from(&data));
    assert_snapshot!(message, @r###"
Hi, I'm *Omar*!

I'm interested in getting a *Vehicle Wrapping* for my vehicle.

*Vehicle Details:*
• Car: *2023 BMW M4*
• Package: *full_wrap satin*
• Condition: *good*
• Timeline: *this_week*
• Color Idea: *Nardo grey*

Looking forward to your quote!
"###);
}

#[test]
fn anonymous_ppf_message_without_vehicle() {
    let fields = MessageFields {
        service: "ppf",
        package: Some("full_front"),
        brand: Some("xpel"),
        condition: "new",
        timing: "asap",
        make: Some("Porsche"),
        ..MessageFields::default()
    };
    assert_snapshot!(format_message(&fields), @r###"
Hi!

I'm interested in getting a *Paint Protection Film (PPF)* for my vehicle.

*Vehicle Details:*
• Car: *Not specified*
• Package: *full_front xpel*
• Condition: *new*
• Timeline: *asap*

Looking forward to your quote!
"###);
}

#[test]
fn unknown_service_id_passes_through() {
    let fields = MessageFields {
        service: "tinting",
        ..MessageFields::default()
    };
    let message = format_message(&fields);
    assert!(message.contains("getting a *tinting* for my vehicle"));
    assert!(message.contains("• Package: **"));
}

#[test]
fn deep_link_encodes_message_like_a_browser() {
    assert_eq!(
        encode_uri_component("Hi, I'm *Omar*!\n• Car"),
        "Hi%2C%20I'm%20*Omar*!%0A%E2%80%A2%20Car"
    );
    let data = wrapping_lead();
    let url = whatsapp_url("+971 56 719 1045", &format_message(&MessageFields::from(&data)));
    assert!(url.starts_with("https://wa.me/971567191045?text=Hi%2C%20I'm%20*Omar*!%0A%0A"));
    assert!(!url.contains(' '));
}
