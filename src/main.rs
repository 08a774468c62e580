#![no_std]
#![no_main]

use core::cell::RefCell;
use core::convert::Infallible;

use bsp::entry;
use cortex_m::peripheral::NVIC;
use critical_section::Mutex;
use defmt::*;
use defmt_rtt as _;
use embedded_hal::digital::InputPin;
use panic_probe as _;
use ufmt::uWrite;

// Provide an alias for our BSP so we can switch targets quickly.
use rp_pico as bsp;

use bsp::hal::{
    clocks::{init_clocks_and_plls, Clock},
    fugit::RateExtU32,
    gpio::bank0::{Gpio14, Gpio15},
    gpio::Interrupt::{EdgeHigh, EdgeLow},
    gpio::{FunctionSioInput, FunctionUart, Pin, PullUp},
    pac,
    pac::interrupt,
    timer::{Alarm, Alarm0, Instant},
    uart::{DataBits, Enabled, StopBits, UartConfig, UartDevice, UartPeripheral, ValidUartPinout},
    watchdog::Watchdog,
    Sio, Timer,
};
use ir_stopwatch::config::{TimerConfig, REPORT_QUEUE_LEN, TICK_PERIOD_US};
use ir_stopwatch::foreground::Foreground;
use ir_stopwatch::rendering::StatusLeds;
use ir_stopwatch::sensors::{latched_levels, EdgeDetector};
use ir_stopwatch::shared::SharedTimer;
use ir_stopwatch::timer::TickDeadline;

const CONFIG: TimerConfig = TimerConfig::DEFAULT;

type SensorPin = Pin<Gpio15, FunctionSioInput, PullUp>;
type ButtonPin = Pin<Gpio14, FunctionSioInput, PullUp>;

static STOPWATCH: SharedTimer<REPORT_QUEUE_LEN> =
    SharedTimer::new(EdgeDetector::new(CONFIG.sensor_policy));

// Handed over to the interrupts once setup is done
static TICK_ALARM: Mutex<RefCell<Option<(Alarm0, Timer, TickDeadline)>>> =
    Mutex::new(RefCell::new(None));
static EDGE_PINS: Mutex<RefCell<Option<(SensorPin, ButtonPin)>>> =
    Mutex::new(RefCell::new(None));

/// Blocking UART as a ufmt writer
struct StatusUart<D: UartDevice, P: ValidUartPinout<D>>(UartPeripheral<Enabled, D, P>);

impl<D: UartDevice, P: ValidUartPinout<D>> uWrite for StatusUart<D, P> {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.0.write_full_blocking(s.as_bytes());
        Ok(())
    }
}

#[entry]
fn main() -> ! {
    info!("IR stopwatch starting");
    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    //
    // The default is to generate a 125 MHz system clock
    let clocks = init_clocks_and_plls(
        bsp::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    // The single-cycle I/O block controls our GPIO pins
    let sio = Sio::new(pac.SIO);

    // Set the pins up according to their function on this particular board
    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // Status lines, 8N1
    let uart_pins = (
        pins.gpio0.into_function::<FunctionUart>(),
        pins.gpio1.into_function::<FunctionUart>(),
    );
    let uart = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(CONFIG.baud_rate.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();
    let mut uart = StatusUart(uart);

    // Green while timing, red while idle
    let mut leds = StatusLeds::new(
        pins.gpio16.into_push_pull_output(),
        pins.gpio17.into_push_pull_output(),
    );

    // IR sensor, both edges
    let mut sensor = pins.gpio15.into_pull_up_input();
    sensor.set_interrupt_enabled(EdgeLow, true);
    sensor.set_interrupt_enabled(EdgeHigh, true);

    // Reset button, press only
    let mut button = pins.gpio14.into_pull_up_input();
    button.set_interrupt_enabled(EdgeLow, true);

    // 1 ms tick
    let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let mut alarm = timer.alarm_0().unwrap();
    let deadline = TickDeadline::starting_at(timer.get_counter().ticks(), TICK_PERIOD_US);
    alarm
        .schedule_at(Instant::from_ticks(deadline.next_us()))
        .unwrap();
    alarm.enable_interrupt();

    critical_section::with(|cs| {
        TICK_ALARM.borrow_ref_mut(cs).replace((alarm, timer, deadline));
        EDGE_PINS.borrow_ref_mut(cs).replace((sensor, button));
    });

    // Safety: everything the handlers touch is installed above
    unsafe {
        NVIC::unmask(pac::Interrupt::TIMER_IRQ_0);
        NVIC::unmask(pac::Interrupt::IO_IRQ_BANK0);
    }

    info!("IR stopwatch ready: {}", CONFIG);

    let mut foreground = Foreground::new(CONFIG.duration_style);
    loop {
        if let Err(e) = foreground.poll(&STOPWATCH, &mut uart, &mut leds) {
            warn!("{}", e);
        }
        // Nothing to do until the next tick or edge
        cortex_m::asm::wfi();
    }
}

#[interrupt]
fn TIMER_IRQ_0() {
    critical_section::with(|cs| {
        if let Some((alarm, timer, deadline)) = TICK_ALARM.borrow_ref_mut(cs).as_mut() {
            alarm.clear_interrupt();
            // absolute deadlines, so handler latency doesn't accumulate
            let next = Instant::from_ticks(deadline.advance());
            if alarm.schedule_at(next).is_err() {
                warn!("tick deadline missed, resyncing");
                let next = Instant::from_ticks(deadline.resync(timer.get_counter().ticks()));
                if alarm.schedule_at(next).is_err() {
                    warn!("tick alarm could not be re-armed");
                }
            }
        }
        STOPWATCH.tick_in(cs);
    });
}

#[interrupt]
fn IO_IRQ_BANK0() {
    critical_section::with(|cs| {
        let mut pins = EDGE_PINS.borrow_ref_mut(cs);
        let Some((sensor, button)) = pins.as_mut() else {
            return;
        };

        let rose = sensor.interrupt_status(EdgeHigh);
        let fell = sensor.interrupt_status(EdgeLow);
        if rose || fell {
            sensor.clear_interrupt(EdgeLow);
            sensor.clear_interrupt(EdgeHigh);
            let high = sensor.is_high().unwrap_or(false);
            let present = CONFIG.sensor_polarity.object_present(high);
            for present in latched_levels(rose, fell, present) {
                STOPWATCH.sensor_edge_in(cs, present);
            }
        }

        if button.interrupt_status(EdgeLow) {
            button.clear_interrupt(EdgeLow);
            STOPWATCH.button_edge_in(cs);
        }
    });
}
