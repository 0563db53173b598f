use anyhow::Result;

use crate::argsets::CopyArgs;
use crate::config::{self, AlarmRoute};
use crate::copier::Copier;
use crate::interfaces::C8yClient;

pub fn copy(args: CopyArgs) -> Result<()> {
    // Fails before any session exists if a setting is missing
    let config = config::from_file(&args.config_path)?;

    let source = C8yClient::new(&config.source, config.page_size);
    let target = C8yClient::new(&config.target, config.page_size);
    log::info!("Copying from {} to {}", source.base_url(), target.base_url());
    if config.alarm_route == AlarmRoute::Event {
        log::info!("Alarms are submitted to the event endpoint of the target tenant");
    }

    match &args.device_id {
        Some(id) => println!("Copying device {id}"),
        None => println!("Copying all devices"),
    }

    let mut copier = Copier::new(&source, &target, config.alarm_route);
    let result = copier.copy_device_tree(args.device_id.as_deref());
    // Counters are reported even when the run was aborted part-way
    println!("{}", copier.stats());
    result?;

    println!("End processing...");
    Ok(())
}
