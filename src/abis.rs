use ethers::contract::abigen;

abigen!(
    StorageVictim,
    r#"[
        function store(uint256 amount) public
        function getStore() public view returns (address, uint256)
    ]"#
);
