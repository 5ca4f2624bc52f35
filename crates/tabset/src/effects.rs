//! Panel side effects
//!
//! Embedded carousels and videos react to their panel being shown or
//! hidden. Rejected playback is expected under autoplay policies and only
//! logged at debug level.

use tabset_dom::NodeId;

use crate::host::Host;
use crate::markers;

/// Run once the panel has settled visible
pub(crate) fn panel_shown<H: Host + ?Sized>(host: &mut H, panel: NodeId) {
    let visible = host.is_rendered(panel);

    for slider in host.query_attribute(panel, markers::SLIDER) {
        let Some(carousel) = host.carousel(slider) else {
            continue;
        };
        carousel.update();

        let count = carousel.slide_count();
        let per_view = carousel.slides_per_view().max(1);
        if count > 0 && carousel.active_index() >= count {
            carousel.slide_to(count - 1);
        }
        // Looping with too few slides duplicates content visibly
        carousel.set_loop(count > per_view);

        if visible && carousel.has_autoplay() {
            if let Err(err) = carousel.start_autoplay() {
                tracing::debug!("carousel autoplay refused in {}: {}", slider, err);
            }
        }
    }

    if !visible {
        return;
    }
    for video in host.query_tag(panel, "video") {
        if let Err(err) = host.play(video) {
            tracing::debug!("video {} did not start: {}", video, err);
        }
    }
}

/// Run as soon as the panel starts hiding
pub(crate) fn panel_hidden<H: Host + ?Sized>(host: &mut H, panel: NodeId) {
    for slider in host.query_attribute(panel, markers::SLIDER) {
        if let Some(carousel) = host.carousel(slider) {
            carousel.stop_autoplay();
        }
    }
    for video in host.query_tag(panel, "video") {
        host.pause(video);
    }
}
