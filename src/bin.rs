#![no_main]
#![no_std]

use core::sync::atomic::{AtomicUsize, Ordering};

use defmt::{debug, error, info, trace, warn};
use defmt_brtt as _; // global logger
use panic_probe as _;

use gps_tracker::{
    config::{FAULT_RELOG_INTERVAL_MS, GPS_BAUD, POLL_INTERVAL_MS, REPORT_INTERVAL_MS},
    mailbox::{Collector, Mailbox, Poster},
    report, Applied, FmtBuf, FrameAssembler, PositionFix, RawSentence, TrackError, Tracker,
    TrackerConfig, TrackerState,
};
use rtic_monotonics::{
    create_systick_token,
    systick::{ExtU32, Systick},
};
use stm32l4xx_hal::{
    gpio::{Alternate, PushPull, PA2, PA3},
    hal::serial::Read as _,
    pac::USART2,
    prelude::*,
    serial::{self, Config, Serial},
};

// same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is invoked
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}

static COUNT: AtomicUsize = AtomicUsize::new(0);
defmt::timestamp!("{=usize}", {
    // NOTE(no-CAS) `timestamps` runs with interrupts disabled
    let n = COUNT.load(Ordering::Relaxed);
    COUNT.store(n + 1, Ordering::Relaxed);
    n
});

type GpsSerial = Serial<USART2, (PA2<Alternate<PushPull, 7>>, PA3<Alternate<PushPull, 7>>)>;

struct GpsUart {
    uart: GpsSerial,
    assembler: FrameAssembler,
    sentences: Poster<RawSentence>,
}

static UART_RX_COUNTER: AtomicUsize = AtomicUsize::new(0);
static UART_RX_ERRORS: AtomicUsize = AtomicUsize::new(0);

#[rtic::app(
    device = stm32l4xx_hal::pac,
    dispatchers = [EXTI2, EXTI3],
)]
mod app {
    use super::*;

    // Shared resources go here
    #[shared]
    struct Shared {
        fix: PositionFix,
        gps_state: TrackerState,
    }

    // Local resources go here
    #[local]
    struct Local {
        gps: GpsUart,
    }

    ////////////////////////////////////////////////////////////////////////////
    // Main thread tasks ///////////////////////////////////////////////////////
    ////////////////////////////////////////////////////////////////////////////

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        trace!("init enter");

        let mut flash = cx.device.FLASH.constrain();
        let mut rcc = cx.device.RCC.constrain();
        let mut pwr = cx.device.PWR.constrain(&mut rcc.apb1r1);
        let clocks = rcc.cfgr.freeze(&mut flash.acr, &mut pwr);

        let mut gpioa = cx.device.GPIOA.split(&mut rcc.ahb2);

        // Create SysTick monotonic for task scheduling
        Systick::start(cx.core.SYST, clocks.sysclk().raw(), create_systick_token!());

        // Initialize UART for GPS
        let tx = gpioa
            .pa2
            .into_alternate(&mut gpioa.moder, &mut gpioa.otyper, &mut gpioa.afrl);
        let rx = gpioa
            .pa3
            .into_alternate(&mut gpioa.moder, &mut gpioa.otyper, &mut gpioa.afrl);

        let mut uart = Serial::usart2(
            cx.device.USART2,
            (tx, rx),
            Config::default().baudrate(GPS_BAUD.bps()),
            clocks,
            &mut rcc.apb1r1,
        );
        uart.listen(serial::Event::Rxne);

        // Completed sentences travel from the UART interrupt to gps_task
        static SENTENCES: Mailbox<RawSentence> = Mailbox::new();
        let (sentences_post, sentences_collect) = SENTENCES.try_split().unwrap();

        gps_task::spawn(sentences_collect).map_err(|_| ()).unwrap();
        report_task::spawn().unwrap();

        info!("done initializing!");
        trace!("init exit");
        (
            Shared {
                fix: PositionFix::new(),
                gps_state: TrackerState::Running,
            },
            Local {
                gps: GpsUart {
                    uart,
                    assembler: FrameAssembler::new(),
                    sentences: sentences_post,
                },
            },
        )
    }

    #[idle]
    fn idle(_: idle::Context) -> ! {
        trace!("idle enter");

        loop {
            // Only sleep in release mode, since the debugger doesn't interact with sleep very nicely
            #[cfg(debug_assertions)]
            cortex_m::asm::nop();
            #[cfg(not(debug_assertions))]
            cortex_m::asm::wfi();
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // Hardware interrupt handlers /////////////////////////////////////////////
    ////////////////////////////////////////////////////////////////////////////

    // Run every received byte through the assembler
    #[task(binds = USART2, priority = 10, local = [gps])]
    fn on_uart(cx: on_uart::Context) {
        let gps = cx.local.gps;
        match gps.uart.read() {
            Ok(b) => {
                UART_RX_COUNTER.fetch_add(1, Ordering::Relaxed);
                if let Some(sentence) = gps.assembler.push(b) {
                    // An unconsumed sentence is replaced, never queued
                    let _ = gps.sentences.post(sentence);
                }
            }
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(_)) => {
                UART_RX_ERRORS.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // Software tasks //////////////////////////////////////////////////////////
    ////////////////////////////////////////////////////////////////////////////

    #[task(priority = 1, shared = [fix, gps_state])]
    async fn gps_task(mut cx: gps_task::Context, sentences: Collector<RawSentence>) {
        trace!("gps_task enter");

        let mut tracker = Tracker::new(TrackerConfig::new());
        let mut overwritten = 0;
        loop {
            while let Some(sentence) = sentences.take() {
                debug!("{}", sentence);
                match tracker.apply(&sentence) {
                    Ok(Applied::Position) | Ok(Applied::NoFix) => {
                        let fix = *tracker.fix();
                        cx.shared.fix.lock(|f| *f = fix);
                    }
                    Ok(Applied::Nothing) => {}
                    Err(TrackError::Coord(e)) => warn!("dropped sentence: {}", e),
                    Err(TrackError::Malformed(_) | TrackError::Faulted) => {
                        let state = tracker.state();
                        cx.shared.gps_state.lock(|s| *s = state);
                        // Subsystem halt: stop draining, keep saying why
                        loop {
                            error!("gps halted: {}", state);
                            Systick::delay(FAULT_RELOG_INTERVAL_MS.millis()).await;
                        }
                    }
                }
            }

            let lost = sentences.overwritten();
            if lost != overwritten {
                warn!(
                    "{} sentences overwritten before parsing ({})",
                    lost - overwritten,
                    tracker.health()
                );
                overwritten = lost;
            }
            Systick::delay(POLL_INTERVAL_MS.millis()).await;
        }
    }

    // The fix consumer: print whatever the tracker last published
    #[task(priority = 1, shared = [fix, gps_state])]
    async fn report_task(mut cx: report_task::Context) {
        loop {
            Systick::delay(REPORT_INTERVAL_MS.millis()).await;

            let fix = cx.shared.fix.lock(|f| *f);
            let state = cx.shared.gps_state.lock(|s| *s);

            let mut line = FmtBuf::<96>::new();
            let _ = report::write_report(&mut line, &fix, state);
            info!("{}", line.as_str().unwrap_or("<unprintable>"));
            debug!(
                "{} | uart rx {} (errors {})",
                fix,
                UART_RX_COUNTER.load(Ordering::Relaxed),
                UART_RX_ERRORS.load(Ordering::Relaxed)
            );
        }
    }
}
