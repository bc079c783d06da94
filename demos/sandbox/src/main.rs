// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Cadence Sandbox
// Drives a scheduler the way a game loop would.

use std::cell::Cell;
use std::rc::Rc;
use std::thread;

use anyhow::{Context, Result};
use cadence_scheduler::{
    Repeat, Scheduler, SchedulerConfig, TargetAllocator, TargetId, TimerSettings,
};

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u32 = 360;
const MENU_OPENS_AT: u32 = 120;
const MENU_CLOSES_AT: u32 = 180;

/// Loads the scheduler configuration from the file named by `CADENCE_CONFIG`,
/// falling back to the defaults when the variable is unset.
fn load_config() -> Result<SchedulerConfig> {
    match std::env::var("CADENCE_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading scheduler config from {path}"))?;
            let config = SchedulerConfig::from_json_str(&json)
                .with_context(|| format!("parsing scheduler config from {path}"))?;
            log::info!("Sandbox: loaded config from {path}.");
            Ok(config)
        }
        Err(_) => Ok(SchedulerConfig::default()),
    }
}

struct Player {
    id: TargetId,
    hp: Rc<Cell<u32>>,
}

fn spawn_player(scheduler: &mut Scheduler, targets: &mut TargetAllocator) -> Player {
    let id = targets.allocate();
    let hp = Rc::new(Cell::new(40));

    let regen = Rc::clone(&hp);
    scheduler.schedule_every(id, "hp-regen", 1.0, false, move |_, dt| {
        regen.set((regen.get() + 5).min(100));
        log::info!("Player: regenerated to {} hp (dt {dt:.3}).", regen.get());
    });

    scheduler.schedule(
        id,
        "spawn-shield",
        TimerSettings::once(0.5),
        move |_, _| log::info!("Player: spawn shield expired."),
    );

    Player { id, hp }
}

fn spawn_turret(scheduler: &mut Scheduler, targets: &mut TargetAllocator) -> TargetId {
    let id = targets.allocate();
    let shots = Rc::new(Cell::new(0u32));
    scheduler.schedule(
        id,
        "volley",
        TimerSettings::every(0.25)
            .repeat(Repeat::Times(3))
            .delay(1.0),
        move |_, _| {
            shots.set(shots.get() + 1);
            log::info!("Turret: shot {} fired.", shots.get());
        },
    );
    id
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut scheduler = Scheduler::with_config(load_config()?);
    let mut targets = TargetAllocator::new();

    let player = spawn_player(&mut scheduler, &mut targets);
    let turret = spawn_turret(&mut scheduler, &mut targets);

    // A worker computes something slow and hands the result back.
    let handle = scheduler.main_thread_handle();
    let worker = thread::spawn(move || {
        let path_cost: u32 = (1..=1_000).sum();
        handle.perform(move || log::info!("Worker: path cost {path_cost} ready on main thread."));
    });

    let mut menu_paused = Default::default();
    for frame in 0..FRAMES {
        if frame == MENU_OPENS_AT {
            menu_paused = scheduler.pause_all_targets();
            log::info!("Sandbox: menu opened, {} target(s) paused.", menu_paused.len());
        }
        if frame == MENU_CLOSES_AT {
            scheduler.resume_targets(std::mem::take(&mut menu_paused));
            log::info!("Sandbox: menu closed.");
        }

        scheduler.update(FRAME_DT);
        let tick = scheduler.last_tick();
        if tick.timers_fired > 0 || tick.functions_performed > 0 {
            log::debug!("Sandbox: frame {frame}: {tick:?}");
        }
    }

    worker
        .join()
        .map_err(|_| anyhow::anyhow!("worker thread panicked"))?;
    scheduler.update(FRAME_DT);

    log::info!(
        "Sandbox: finished {} ticks with player at {} hp. Turret still scheduled: {}.",
        scheduler.tick_count(),
        player.hp.get(),
        scheduler.is_scheduled("volley", turret)
    );

    scheduler.unschedule_all_for_target(player.id);
    targets.release(player.id);
    scheduler.teardown();
    Ok(())
}
