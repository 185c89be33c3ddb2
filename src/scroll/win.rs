use crate::scroll::dispatcher::InjectionSink;
use crate::scroll::engine::CursorControl;
use crate::scroll::geometry::Point;
use crate::scroll::hook::INJECT_TAG;
use crate::scroll::state::{InputKind, InputRecord};
use anyhow::anyhow;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_HWHEEL, MOUSEEVENTF_MIDDLEDOWN,
    MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_WHEEL, MOUSEINPUT,
};

/// Synthesizes input through `SendInput`.
#[derive(Debug, Default)]
pub struct SendInputSink;

fn to_input(record: &InputRecord) -> INPUT {
    let (flags, data) = match record.kind {
        InputKind::MiddleDown => (MOUSEEVENTF_MIDDLEDOWN, 0),
        InputKind::MiddleUp => (MOUSEEVENTF_MIDDLEUP, 0),
        InputKind::HorizontalWheel => (MOUSEEVENTF_HWHEEL, record.magnitude),
        InputKind::VerticalWheel => (MOUSEEVENTF_WHEEL, record.magnitude),
    };
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: record.pos.x,
                dy: record.pos.y,
                // Signed wheel delta; the field's integer type varies by binding version.
                mouseData: data as _,
                dwFlags: flags,
                time: 0,
                // Lets our own hook recognise and skip what we inject.
                dwExtraInfo: INJECT_TAG,
            },
        },
    }
}

impl InjectionSink for SendInputSink {
    fn inject(&self, batch: &[InputRecord]) -> anyhow::Result<()> {
        let inputs: Vec<INPUT> = batch.iter().map(to_input).collect();
        let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };
        if sent as usize != inputs.len() {
            return Err(anyhow!(
                "SendInput accepted {sent} of {} inputs: {}",
                inputs.len(),
                windows::core::Error::from_win32()
            ));
        }
        Ok(())
    }
}

/// The real system cursor.
#[derive(Debug, Default)]
pub struct SystemCursor;

impl CursorControl for SystemCursor {
    fn position(&self) -> Option<Point> {
        use windows::Win32::Foundation::POINT;
        use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

        let mut point = POINT { x: 0, y: 0 };
        if unsafe { GetCursorPos(&mut point).is_ok() } {
            Some(Point::new(point.x, point.y))
        } else {
            None
        }
    }

    fn warp(&self, to: Point) {
        use windows::Win32::UI::WindowsAndMessaging::SetCursorPos;

        if let Err(err) = unsafe { SetCursorPos(to.x, to.y) } {
            tracing::trace!(?err, "failed to warp cursor");
        }
    }
}
